//! Plain-text rendering of checklist and schedule views.

use std::fmt::Write as _;

use study_core::calendar::display_date;
use study_core::model::{Objective, Progress};
use study_core::{Checklist, DayPlan, NodeKey, ProgressStats, RevisionItem, ToggleOutcome};

fn bar(progress: Progress) -> String {
    format!(
        "[{:>3}/{:<3} {:>3}%]",
        progress.completed,
        progress.total,
        progress.rounded_percentage()
    )
}

fn mark(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn objective_lines(out: &mut String, checklist: &Checklist, objective: &Objective) {
    let meta = format!("({}, {})", objective.objective_type, objective.difficulty);
    if objective.is_leaf() {
        let checked = checklist.is_checked(objective.id.as_str());
        let _ = writeln!(out, "      {} {} {} {meta}", mark(checked), objective.id, objective.text);
        return;
    }
    let progress = checklist.objective_progress(objective);
    let _ = writeln!(out, "      {} {} {} {meta}", bar(progress), objective.id, objective.text);
    for sub in objective.sub_objectives() {
        let checked = checklist.is_checked(sub.id.as_str());
        let _ = writeln!(out, "        {} {} {}", mark(checked), sub.id, sub.text);
    }
}

/// Whole tree with an aggregate on every container.
pub fn checklist(checklist: &Checklist) -> String {
    let mut out = String::new();
    for component in checklist.curriculum().components() {
        let p = checklist.component_progress(component);
        let _ = writeln!(out, "{} {} {}", bar(p), component.id, component.title);
        for topic in &component.topics {
            let p = checklist.topic_progress(topic);
            let _ = writeln!(out, "  {} {} {}", bar(p), topic.id, topic.title);
            for subtopic in &topic.subtopics {
                let p = checklist.subtopic_progress(subtopic);
                let _ = writeln!(out, "    {} {} {}", bar(p), subtopic.id, subtopic.title);
                for objective in &subtopic.objectives {
                    objective_lines(&mut out, checklist, objective);
                }
            }
        }
    }
    let overall = checklist.overall_progress();
    let _ = writeln!(out, "{} overall", bar(overall));
    out
}

fn node_label(key: &NodeKey) -> String {
    match key {
        NodeKey::Component(id) => format!("component {id}"),
        NodeKey::Topic(id) => format!("topic {id}"),
        NodeKey::Subtopic(id) => format!("subtopic {id}"),
        NodeKey::Objective(id) => format!("objective {id}"),
    }
}

pub fn toggle(outcome: &ToggleOutcome, refreshed: &[(NodeKey, Progress)]) -> String {
    let mut out = format!(
        "{} {}\n",
        outcome.id,
        if outcome.checked { "checked" } else { "unchecked" }
    );
    if !outcome.is_tracked() {
        out.push_str("  (not a checklist item; no progress affected)\n");
    }
    for (key, progress) in refreshed {
        let _ = writeln!(out, "  {} {}", bar(*progress), node_label(key));
    }
    out
}

fn item_line(item: &RevisionItem) -> String {
    let state = if item.completed {
        "[x]"
    } else if item.needs_review {
        "[?]"
    } else {
        "[ ]"
    };
    format!(
        "{state} {} {} ({} / {}, {})",
        item.id, item.objective, item.topic_title, item.subtopic_title, item.difficulty
    )
}

pub fn items(items: &[&RevisionItem]) -> String {
    if items.is_empty() {
        return "no matching objectives\n".to_owned();
    }
    items.iter().map(|item| item_line(item) + "\n").collect()
}

pub fn day(plan: &DayPlan<'_>) -> String {
    let mut out = format!("{} ({})\n", display_date(plan.date), plan.key());
    match plan.primary() {
        None => out.push_str("  nothing scheduled\n"),
        Some(primary) => {
            let _ = writeln!(out, "  focus: {}", primary.objective);
            for item in &plan.items {
                let _ = writeln!(out, "  {}", item_line(item));
            }
        }
    }
    out
}

pub fn week(days: &[DayPlan<'_>]) -> String {
    let mut out = String::new();
    for plan in days {
        let done = plan.items.iter().filter(|item| item.completed).count();
        let status = if plan.items.is_empty() {
            "-".to_owned()
        } else {
            format!("{done}/{}", plan.items.len())
        };
        let _ = writeln!(
            out,
            "{} {:<5} {}",
            plan.date.format("%a %d/%m"),
            status,
            plan.primary().map_or("", |item| item.objective.as_str())
        );
    }
    out
}

pub fn stats(stats: &ProgressStats, days_remaining: i64) -> String {
    format!(
        "completed {}/{} ({}%)\nstreak {} day(s)\n{} day(s) remaining\nfoundation {}, intermediate {}, advanced {}\n",
        stats.completed,
        stats.total,
        stats.percentage,
        stats.streak,
        days_remaining.max(0),
        stats.difficulty.foundation,
        stats.difficulty.intermediate,
        stats.difficulty.advanced,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use study_core::model::{CheckedState, Curriculum, ObjectiveId};

    #[test]
    fn checklist_shows_aggregates_and_marks() {
        let mut list = Checklist::new(Arc::new(Curriculum::fallback()), CheckedState::new());
        list.toggle(&ObjectiveId::new("1.1.1.a"));
        let text = checklist(&list);
        assert!(text.starts_with("[  1/10   10%] 01 Computer Systems"));
        assert!(text.contains("[x] 1.1.1.a"));
        assert!(text.contains("[ ] 1.1.1.b"));
        assert!(text.trim_end().ends_with("overall"));
    }

    #[test]
    fn untracked_toggle_is_called_out() {
        let outcome = ToggleOutcome {
            id: ObjectiveId::new("ghost-id"),
            checked: true,
            stale: Vec::new(),
        };
        assert!(toggle(&outcome, &[]).contains("not a checklist item"));
    }

    #[test]
    fn empty_day_says_so() {
        let plan = DayPlan {
            date: chrono::NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
            items: Vec::new(),
        };
        let text = day(&plan);
        assert!(text.starts_with("16/01/2026 (2026-01-16)"));
        assert!(text.contains("nothing scheduled"));
    }

    #[test]
    fn stats_clamp_negative_days_remaining() {
        let text = stats(&ProgressStats::default(), -3);
        assert!(text.contains("0 day(s) remaining"));
    }
}
