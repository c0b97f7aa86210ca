//! Academic tag reconciliation policy.
//!
//! Computes, as data, what the tag lifecycle manager must do to bring a
//! member's FINALIST/ALUMNI assignments in line with their academic
//! standing. Keeping the convergence decision pure means the mutual
//! exclusion invariant is tested without a database; the HTTP-layer
//! service merely executes the returned plan.

use crate::models::tag::system_tags;
use crate::services::academic::AcademicStanding;

/// Currently active academic tag rows for one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcademicTagState {
    pub has_active_finalist: bool,
    pub has_active_alumni: bool,
}

/// One deactivation to perform, with the reason recorded on the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deactivation {
    pub tag_name: &'static str,
    pub reason: &'static str,
}

/// Convergence plan; empty when the state already matches the standing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcademicTagPlan {
    /// Tag to ensure exactly one active assignment of, if any.
    pub ensure_active: Option<&'static str>,
    pub deactivate: Vec<Deactivation>,
}

impl AcademicTagPlan {
    pub fn is_noop(&self) -> bool {
        self.ensure_active.is_none() && self.deactivate.is_empty()
    }
}

/// Plans the tag mutations that converge `state` onto `standing`.
///
/// Safe to run redundantly: a state that already matches yields an empty
/// plan.
pub fn reconcile_academic_tags(
    standing: AcademicStanding,
    state: AcademicTagState,
) -> AcademicTagPlan {
    let mut plan = AcademicTagPlan::default();

    match standing {
        AcademicStanding::Finalist => {
            if !state.has_active_finalist {
                plan.ensure_active = Some(system_tags::FINALIST);
            }
            if state.has_active_alumni {
                plan.deactivate.push(Deactivation {
                    tag_name: system_tags::ALUMNI,
                    reason: "now a finalist",
                });
            }
        }
        AcademicStanding::Alumni => {
            if !state.has_active_alumni {
                plan.ensure_active = Some(system_tags::ALUMNI);
            }
            if state.has_active_finalist {
                plan.deactivate.push(Deactivation {
                    tag_name: system_tags::FINALIST,
                    reason: "now an alumnus",
                });
            }
        }
        AcademicStanding::None => {
            if state.has_active_finalist {
                plan.deactivate.push(Deactivation {
                    tag_name: system_tags::FINALIST,
                    reason: "no longer qualifies",
                });
            }
            if state.has_active_alumni {
                plan.deactivate.push(Deactivation {
                    tag_name: system_tags::ALUMNI,
                    reason: "no longer qualifies",
                });
            }
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(finalist: bool, alumni: bool) -> AcademicTagState {
        AcademicTagState {
            has_active_finalist: finalist,
            has_active_alumni: alumni,
        }
    }

    #[test]
    fn test_finalist_from_clean_state() {
        let plan = reconcile_academic_tags(AcademicStanding::Finalist, state(false, false));
        assert_eq!(plan.ensure_active, Some(system_tags::FINALIST));
        assert!(plan.deactivate.is_empty());
    }

    #[test]
    fn test_finalist_supersedes_alumni() {
        let plan = reconcile_academic_tags(AcademicStanding::Finalist, state(false, true));
        assert_eq!(plan.ensure_active, Some(system_tags::FINALIST));
        assert_eq!(
            plan.deactivate,
            vec![Deactivation {
                tag_name: system_tags::ALUMNI,
                reason: "now a finalist",
            }]
        );
    }

    #[test]
    fn test_alumni_supersedes_finalist() {
        let plan = reconcile_academic_tags(AcademicStanding::Alumni, state(true, false));
        assert_eq!(plan.ensure_active, Some(system_tags::ALUMNI));
        assert_eq!(
            plan.deactivate,
            vec![Deactivation {
                tag_name: system_tags::FINALIST,
                reason: "now an alumnus",
            }]
        );
    }

    #[test]
    fn test_neither_clears_both() {
        let plan = reconcile_academic_tags(AcademicStanding::None, state(true, true));
        assert!(plan.ensure_active.is_none());
        assert_eq!(plan.deactivate.len(), 2);
    }

    #[test]
    fn test_matching_state_is_noop() {
        assert!(reconcile_academic_tags(AcademicStanding::Finalist, state(true, false)).is_noop());
        assert!(reconcile_academic_tags(AcademicStanding::Alumni, state(false, true)).is_noop());
        assert!(reconcile_academic_tags(AcademicStanding::None, state(false, false)).is_noop());
    }

    #[test]
    fn test_plan_never_leaves_both_active() {
        // Property: executing the plan from any state leaves at most one
        // of FINALIST/ALUMNI active.
        for standing in [
            AcademicStanding::None,
            AcademicStanding::Finalist,
            AcademicStanding::Alumni,
        ] {
            for (f, a) in [(false, false), (true, false), (false, true), (true, true)] {
                let plan = reconcile_academic_tags(standing, state(f, a));

                let mut finalist = f;
                let mut alumni = a;
                for d in &plan.deactivate {
                    match d.tag_name {
                        system_tags::FINALIST => finalist = false,
                        system_tags::ALUMNI => alumni = false,
                        _ => {}
                    }
                }
                match plan.ensure_active {
                    Some(system_tags::FINALIST) => finalist = true,
                    Some(system_tags::ALUMNI) => alumni = true,
                    _ => {}
                }

                assert!(
                    !(finalist && alumni),
                    "standing {:?} from ({}, {}) left both active",
                    standing,
                    f,
                    a
                );
            }
        }
    }

    #[test]
    fn test_double_reconcile_is_stable() {
        // Running the planner against the state a plan produces yields a
        // no-op: reconciliation converges in one step.
        for standing in [
            AcademicStanding::None,
            AcademicStanding::Finalist,
            AcademicStanding::Alumni,
        ] {
            for (f, a) in [(false, false), (true, false), (false, true), (true, true)] {
                let plan = reconcile_academic_tags(standing, state(f, a));

                let mut next = state(f, a);
                for d in &plan.deactivate {
                    match d.tag_name {
                        system_tags::FINALIST => next.has_active_finalist = false,
                        system_tags::ALUMNI => next.has_active_alumni = false,
                        _ => {}
                    }
                }
                match plan.ensure_active {
                    Some(system_tags::FINALIST) => next.has_active_finalist = true,
                    Some(system_tags::ALUMNI) => next.has_active_alumni = true,
                    _ => {}
                }

                assert!(reconcile_academic_tags(standing, next).is_noop());
            }
        }
    }
}
