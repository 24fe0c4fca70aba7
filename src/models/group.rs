//! Group and membership models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Named user collection; problems and contests may each be restricted to
/// a set of groups
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Group {
    pub id: i32,
    pub name: String,
}

/// Ties a user to a group with an integer trust level (higher = more trusted)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GroupMembership {
    pub user_id: i32,
    pub group_id: i32,
    pub level: i32,
}

/// Canonical membership order: level descending, group id ascending.
///
/// Permission resolution scans memberships in this order and stops at the
/// first group attached to the target, so the order is part of the
/// permission contract, not a presentation choice.
pub fn sort_memberships(memberships: &mut [GroupMembership]) {
    memberships.sort_by(|a, b| b.level.cmp(&a.level).then(a.group_id.cmp(&b.group_id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(group_id: i32, level: i32) -> GroupMembership {
        GroupMembership {
            user_id: 1,
            group_id,
            level,
        }
    }

    #[test]
    fn test_membership_order_is_level_desc_then_group_asc() {
        let mut m = vec![
            membership(5, 1),
            membership(3, 2),
            membership(9, 2),
            membership(1, 0),
        ];
        sort_memberships(&mut m);

        let order: Vec<(i32, i32)> = m.iter().map(|x| (x.group_id, x.level)).collect();
        assert_eq!(order, vec![(3, 2), (9, 2), (5, 1), (1, 0)]);
    }

    #[test]
    fn test_membership_order_is_deterministic() {
        let mut a = vec![membership(2, 1), membership(1, 1)];
        let mut b = vec![membership(1, 1), membership(2, 1)];
        sort_memberships(&mut a);
        sort_memberships(&mut b);
        assert_eq!(
            a.iter().map(|x| x.group_id).collect::<Vec<_>>(),
            b.iter().map(|x| x.group_id).collect::<Vec<_>>()
        );
    }
}
