//! Submission listing: filter assembly, visibility scoping and pagination
//!
//! Both pagination modes serve the same logical order, submission id
//! descending. Counting pagination pays a full count for exact page
//! numbers; fast pagination selects around the caller's boundary cursors
//! and never counts.

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::constants::{LANGUAGE_NON_SUBMIT_ANSWER, LANGUAGE_SUBMIT_ANSWER, statuses};
use crate::db::repositories::UserRepository;
use crate::error::{AppError, AppResult};
use crate::models::{
    Contest, ContestType, DisplayConfig, JudgeState, RoughResult, SubmissionInfo, noi_masked_status,
    rough_result,
};
use crate::pagination::{CursorRequest, FastPageMeta, Paginate};
use crate::services::notification_service::{NotificationService, NotificationType};

/// Language filter, including the two special submit-answer values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageFilter {
    Exact(String),
    /// Submissions with no language (answer uploads)
    SubmitAnswer,
    /// Submissions with a language
    NonSubmitAnswer,
}

impl LanguageFilter {
    pub fn parse(raw: &str) -> Self {
        match raw {
            LANGUAGE_SUBMIT_ANSWER => Self::SubmitAnswer,
            LANGUAGE_NON_SUBMIT_ANSWER => Self::NonSubmitAnswer,
            other => Self::Exact(other.to_string()),
        }
    }
}

/// Caller-provided filters for one listing request
#[derive(Debug, Clone, Default)]
pub struct SubmissionListQuery {
    pub submitter: Option<String>,
    pub min_score: Option<i32>,
    pub max_score: Option<i32>,
    pub language: Option<String>,
    pub status: Option<String>,
    /// Contest-local 1-based problem number when scoped to a contest,
    /// global problem id otherwise
    pub problem: Option<i32>,
}

/// The caller as seen by the visibility scoping
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user_id: Option<i32>,
    /// Managers bypass the public/group visibility scoping
    pub privileged: bool,
    pub group_ids: Vec<i32>,
}

/// One served listing row
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRow {
    pub info: SubmissionInfo,
    pub result: Option<RoughResult>,
    /// Present while the row is still judging; lets the caller subscribe
    /// to the push channel for the final result
    pub push_token: Option<String>,
}

pub struct SubmissionQueryService;

impl SubmissionQueryService {
    /// Counting pagination: exact total and page window
    pub async fn list_counted(
        pool: &PgPool,
        contest: Option<&Contest>,
        query: &SubmissionListQuery,
        viewer: &Viewer,
        page: Option<i64>,
        per_page: i64,
    ) -> AppResult<(Vec<JudgeState>, Paginate)> {
        let Some(resolved) = Self::resolve(pool, contest, query).await? else {
            return Ok((Vec::new(), Paginate::new(0, page, per_page)));
        };

        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM judge_states");
        Self::push_filter(&mut count_builder, contest, &resolved, viewer);
        let total: i64 = count_builder.build_query_scalar().fetch_one(pool).await?;

        let paginate = Paginate::new(total, page, per_page);

        let mut builder = QueryBuilder::new("SELECT * FROM judge_states");
        Self::push_filter(&mut builder, contest, &resolved, viewer);
        builder.push(" ORDER BY id DESC OFFSET ");
        builder.push_bind(paginate.offset());
        builder.push(" LIMIT ");
        builder.push_bind(paginate.per_page);

        let rows = builder
            .build_query_as::<JudgeState>()
            .fetch_all(pool)
            .await?;

        Ok((rows, paginate))
    }

    /// Fast pagination: cursor window around the displayed boundaries,
    /// never counting the table
    pub async fn list_fast(
        pool: &PgPool,
        contest: Option<&Contest>,
        query: &SubmissionListQuery,
        viewer: &Viewer,
        page: Option<i64>,
        curr_page: Option<i64>,
        curr_top: Option<i64>,
        curr_bottom: Option<i64>,
        per_page: i64,
    ) -> AppResult<(Vec<JudgeState>, FastPageMeta)> {
        let request = CursorRequest::from_query(page, curr_page, curr_top, curr_bottom);
        let page_number = request.page_number(curr_page);

        let Some(resolved) = Self::resolve(pool, contest, query).await? else {
            let meta = FastPageMeta::from_ids(page_number, per_page, &[], false, false);
            return Ok((Vec::new(), meta));
        };

        let window = request.window(per_page);

        let mut builder = QueryBuilder::new("SELECT * FROM judge_states");
        Self::push_filter(&mut builder, contest, &resolved, viewer);
        if let Some(below) = window.below {
            builder.push(" AND id < ");
            builder.push_bind(below);
        }
        if let Some(above) = window.above {
            builder.push(" AND id > ");
            builder.push_bind(above);
        }
        builder.push(if window.ascending {
            " ORDER BY id ASC"
        } else {
            " ORDER BY id DESC"
        });
        if window.offset > 0 {
            builder.push(" OFFSET ");
            builder.push_bind(window.offset);
        }
        // one row beyond the page tells us whether the scan can continue
        builder.push(" LIMIT ");
        builder.push_bind(per_page + 1);

        let mut rows = builder
            .build_query_as::<JudgeState>()
            .fetch_all(pool)
            .await?;
        let more = rows.len() as i64 > per_page;
        rows.truncate(per_page as usize);
        if window.ascending {
            rows.reverse();
        }

        let (has_prev, has_next) = match request {
            CursorRequest::First => (false, more),
            CursorRequest::Forward { .. } => (true, more),
            CursorRequest::Backward { .. } => (more, true),
            CursorRequest::Refresh { .. } => (page_number > 1, more),
            CursorRequest::Jump { page } => (page > 1, more),
        };

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let meta = FastPageMeta::from_ids(page_number, per_page, &ids, has_prev, has_next);

        Ok((rows, meta))
    }

    /// Mask raw rows into caller-visible listing rows, stamping pending
    /// rows with a push token
    pub fn present(
        judges: &[JudgeState],
        contest: Option<&Contest>,
        display: &DisplayConfig,
        secret: &str,
    ) -> AppResult<Vec<SubmissionRow>> {
        let masks_status = match contest {
            Some(c) => c.contest_type()? == ContestType::Noi && !c.is_ended(),
            None => false,
        };

        judges
            .iter()
            .map(|judge| {
                let mut info = SubmissionInfo::from_judge(judge, display);
                if let Some(c) = contest {
                    if let Some(number) = c.problem_number(judge.problem_id) {
                        info.problem_id = number as i32;
                    }
                }

                let result = match rough_result(judge, display) {
                    Some(mut rough) => {
                        if masks_status && !display.show_result {
                            rough.status = noi_masked_status(&rough.status).to_string();
                        }
                        Some(rough)
                    }
                    // judged but withheld: collapse to the generic state
                    None if !judge.pending && display.in_contest => Some(RoughResult {
                        status: statuses::SUBMITTED.to_string(),
                        score: None,
                    }),
                    None => None,
                };

                let push_token =
                    NotificationService::issue(judge, NotificationType::Rough, display, secret)?;

                Ok(SubmissionRow {
                    info,
                    result,
                    push_token,
                })
            })
            .collect()
    }

    /// Resolve name and scope-dependent filters. `None` means the filter
    /// can match nothing (unknown submitter).
    async fn resolve(
        pool: &PgPool,
        contest: Option<&Contest>,
        query: &SubmissionListQuery,
    ) -> AppResult<Option<ResolvedQuery>> {
        let submitter_id = match &query.submitter {
            Some(name) => match UserRepository::find_by_username(pool, name).await? {
                Some(user) => Some(user.id),
                None => return Ok(None),
            },
            None => None,
        };

        let problem_id = match (contest, query.problem) {
            (Some(c), Some(number)) => {
                let id = c.problem_at(number as usize).ok_or_else(|| {
                    AppError::NotFound(format!("Contest {} has no problem {number}", c.id))
                })?;
                Some(id)
            }
            (None, id) => id,
            (Some(_), None) => None,
        };

        Ok(Some(ResolvedQuery {
            submitter_id,
            problem_id,
            min_score: query.min_score,
            max_score: query.max_score,
            language: query.language.as_deref().map(LanguageFilter::parse),
            status: query.status.clone(),
        }))
    }

    fn push_filter(
        builder: &mut QueryBuilder<'_, Postgres>,
        contest: Option<&Contest>,
        query: &ResolvedQuery,
        viewer: &Viewer,
    ) {
        match contest {
            Some(c) => {
                builder.push(" WHERE kind = 1 AND contest_id = ");
                builder.push_bind(c.id);
            }
            None => {
                builder.push(" WHERE kind = 0");
            }
        }

        if let Some(id) = query.submitter_id {
            builder.push(" AND user_id = ");
            builder.push_bind(id);
        }
        if let Some(id) = query.problem_id {
            builder.push(" AND problem_id = ");
            builder.push_bind(id);
        }
        if let Some(min) = query.min_score {
            builder.push(" AND score >= ");
            builder.push_bind(min);
        }
        if let Some(max) = query.max_score {
            builder.push(" AND score <= ");
            builder.push_bind(max);
        }
        if let Some(status) = &query.status {
            builder.push(" AND status = ");
            builder.push_bind(status.clone());
        }
        match &query.language {
            Some(LanguageFilter::SubmitAnswer) => {
                builder.push(" AND (language IS NULL OR language = '')");
            }
            Some(LanguageFilter::NonSubmitAnswer) => {
                builder.push(" AND language IS NOT NULL AND language <> ''");
            }
            Some(LanguageFilter::Exact(language)) => {
                builder.push(" AND language = ");
                builder.push_bind(language.clone());
            }
            None => {}
        }

        // open listings for ordinary callers only show rows whose problem
        // is public and group-visible, or the caller's own rows
        if contest.is_none() && !viewer.privileged {
            builder.push(" AND (");
            if let Some(user_id) = viewer.user_id {
                builder.push("user_id = ");
                builder.push_bind(user_id);
                builder.push(" OR ");
            }
            builder.push(
                "(is_public AND (NOT EXISTS \
                 (SELECT 1 FROM problem_group_map m WHERE m.problem_id = judge_states.problem_id) \
                 OR EXISTS (SELECT 1 FROM problem_group_map m \
                 WHERE m.problem_id = judge_states.problem_id AND m.group_id = ANY(",
            );
            builder.push_bind(viewer.group_ids.clone());
            builder.push(")))))");
        }
    }
}

struct ResolvedQuery {
    submitter_id: Option<i32>,
    problem_id: Option<i32>,
    min_score: Option<i32>,
    max_score: Option<i32>,
    language: Option<LanguageFilter>,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionKind;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    const SECRET: &str = "push-channel-secret";

    fn judge(id: i64, status: &str, pending: bool) -> JudgeState {
        JudgeState {
            id,
            user_id: 10,
            problem_id: 102,
            status: status.to_string(),
            score: Some(100),
            kind: SubmissionKind::Contest,
            contest_id: Some(1),
            pending,
            task_id: pending.then(Uuid::new_v4),
            language: Some("cpp".to_string()),
            code: String::new(),
            is_public: true,
            submit_time: Utc::now(),
        }
    }

    fn running_contest(contest_type: &str) -> Contest {
        Contest {
            id: 1,
            title: "Live Round".to_string(),
            contest_type: contest_type.to_string(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2999, 1, 1, 12, 0, 0).unwrap(),
            problems: vec![101, 102, 103],
            admins: vec![],
            is_public: true,
            hide_statistics: false,
            read_rating: false,
            owner_id: 3,
            primary_ranklist_id: 11,
            restricted_ranklist_id: 12,
        }
    }

    #[test]
    fn test_language_filter_special_values() {
        assert_eq!(LanguageFilter::parse("submit-answer"), LanguageFilter::SubmitAnswer);
        assert_eq!(
            LanguageFilter::parse("non-submit-answer"),
            LanguageFilter::NonSubmitAnswer
        );
        assert_eq!(
            LanguageFilter::parse("rust"),
            LanguageFilter::Exact("rust".to_string())
        );
    }

    #[test]
    fn test_present_remaps_problem_to_contest_number() {
        let contest = running_contest("acm");
        let rows = SubmissionQueryService::present(
            &[judge(5, "Accepted", false)],
            Some(&contest),
            &contest.display_config().unwrap(),
            SECRET,
        )
        .unwrap();

        assert_eq!(rows[0].info.problem_id, 2);
    }

    #[test]
    fn test_present_collapses_withheld_results_to_submitted() {
        let contest = running_contest("noi");
        let display = contest.display_config().unwrap();
        let rows = SubmissionQueryService::present(
            &[judge(5, "Wrong Answer", false), judge(6, "Compile Error", false)],
            Some(&contest),
            &display,
            SECRET,
        )
        .unwrap();

        let wa = rows[0].result.as_ref().unwrap();
        assert_eq!(wa.status, "Submitted");
        assert_eq!(wa.score, None);

        // compile errors pass through the restricted feedback
        let ce = rows[1].result.as_ref().unwrap();
        assert_eq!(ce.status, "Compile Error");
    }

    #[test]
    fn test_present_stamps_pending_rows_with_push_token() {
        let contest = running_contest("acm");
        let display = contest.display_config().unwrap();
        let rows = SubmissionQueryService::present(
            &[judge(5, "Waiting", true), judge(6, "Accepted", false)],
            Some(&contest),
            &display,
            SECRET,
        )
        .unwrap();

        assert!(rows[0].push_token.is_some());
        assert!(rows[0].result.is_none());
        assert!(rows[1].push_token.is_none());
        assert_eq!(rows[1].result.as_ref().unwrap().status, "Accepted");
    }

    #[test]
    fn test_present_hides_language_when_code_hidden() {
        let contest = running_contest("ioi");
        let display = contest.display_config().unwrap();
        let rows = SubmissionQueryService::present(
            &[judge(5, "Accepted", false)],
            Some(&contest),
            &display,
            SECRET,
        )
        .unwrap();

        assert_eq!(rows[0].info.language, None);
    }
}
