use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::calendar::{self, DateRange};
use crate::model::{
    ComponentId, Curriculum, Difficulty, DifficultyHistogram, ItemId, ObjectiveId,
    ProgressRecord, SubtopicId, TopicId,
};

//
// ─── REVISION ITEMS ────────────────────────────────────────────────────────────
//

/// One learning objective flattened with its ancestor titles.
///
/// Completion here is independent from the checklist: it comes from the
/// revision progress record, not from checked leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionItem {
    pub id: ItemId,
    pub component_id: ComponentId,
    pub component_title: String,
    pub topic_id: TopicId,
    pub topic_title: String,
    pub subtopic_id: SubtopicId,
    pub subtopic_title: String,
    pub objective_id: ObjectiveId,
    pub objective: String,
    #[serde(rename = "type")]
    pub objective_type: String,
    pub difficulty: Difficulty,
    pub scheduled_date: Option<NaiveDate>,
    pub completed: bool,
    pub needs_review: bool,
}

/// Flatten every objective of the curriculum in document order.
///
/// Sub-objectives are not scheduled on their own; they are revised together
/// with their parent. Ids are `obj-0`, `obj-1`, ... in that order.
#[must_use]
pub fn flatten(curriculum: &Curriculum) -> Vec<RevisionItem> {
    let mut items = Vec::new();
    for component in curriculum.components() {
        for topic in &component.topics {
            for subtopic in &topic.subtopics {
                for objective in &subtopic.objectives {
                    items.push(RevisionItem {
                        id: ItemId::from_index(items.len()),
                        component_id: component.id.clone(),
                        component_title: component.title.clone(),
                        topic_id: topic.id.clone(),
                        topic_title: topic.title.clone(),
                        subtopic_id: subtopic.id.clone(),
                        subtopic_title: subtopic.title.clone(),
                        objective_id: objective.id.clone(),
                        objective: objective.text.clone(),
                        objective_type: objective.objective_type.clone(),
                        difficulty: objective.difficulty,
                        scheduled_date: None,
                        completed: false,
                        needs_review: false,
                    });
                }
            }
        }
    }
    items
}

/// Copy the persisted flags onto freshly flattened items.
pub fn apply_record(items: &mut [RevisionItem], record: &ProgressRecord) {
    let completed: HashSet<&ItemId> = record.completed.iter().collect();
    let needs_review: HashSet<&ItemId> = record.needs_review.iter().collect();
    for item in items {
        item.completed = completed.contains(&item.id);
        item.needs_review = needs_review.contains(&item.id);
    }
}

//
// ─── QUERIES ───────────────────────────────────────────────────────────────────
//

/// Conjunctive filter; `None` fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub difficulty: Option<Difficulty>,
    pub component: Option<ComponentId>,
    pub objective_type: Option<String>,
    pub completed: Option<bool>,
    pub needs_review: Option<bool>,
}

impl ItemFilter {
    #[must_use]
    pub fn matches(&self, item: &RevisionItem) -> bool {
        self.difficulty.is_none_or(|d| item.difficulty == d)
            && self
                .component
                .as_ref()
                .is_none_or(|c| &item.component_id == c)
            && self
                .objective_type
                .as_deref()
                .is_none_or(|t| item.objective_type == t)
            && self.completed.is_none_or(|c| item.completed == c)
            && self.needs_review.is_none_or(|r| item.needs_review == r)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub total: usize,
    pub completed: usize,
    /// Rounded to the nearest whole percent; zero when there are no items.
    pub percentage: u32,
    pub streak: usize,
    pub difficulty: DifficultyHistogram,
}

/// Items scheduled on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan<'a> {
    pub date: NaiveDate,
    pub items: Vec<&'a RevisionItem>,
}

impl<'a> DayPlan<'a> {
    /// The item shown as the day's headline, if any.
    #[must_use]
    pub fn primary(&self) -> Option<&'a RevisionItem> {
        self.items.first().copied()
    }

    /// Vacuously true for a day with nothing scheduled.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.items.iter().all(|item| item.completed)
    }

    #[must_use]
    pub fn key(&self) -> String {
        calendar::date_key(self.date)
    }
}

//
// ─── SCHEDULE ──────────────────────────────────────────────────────────────────
//

/// Revision items partitioned over an inclusive date range.
///
/// Every item sits on exactly one date. Buckets are filled in calendar order
/// with at most `per_day` items, foundation first, then intermediate, then
/// advanced, keeping document order within a tier.
#[derive(Debug, Clone)]
pub struct RevisionSchedule {
    range: DateRange,
    per_day: usize,
    items: Vec<RevisionItem>,
    days: BTreeMap<NaiveDate, Vec<usize>>,
    index: HashMap<ItemId, usize>,
}

impl RevisionSchedule {
    #[must_use]
    pub fn distribute(mut items: Vec<RevisionItem>, range: DateRange) -> Self {
        let per_day = items.len().div_ceil(range.len());

        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by_key(|&i| items[i].difficulty);

        let mut pending = order.into_iter();
        let mut days = BTreeMap::new();
        for date in range.iter() {
            let bucket: Vec<usize> = pending.by_ref().take(per_day).collect();
            for &i in &bucket {
                items[i].scheduled_date = Some(date);
            }
            days.insert(date, bucket);
        }

        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();

        Self {
            range,
            per_day,
            items,
            days,
            index,
        }
    }

    #[must_use]
    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Upper bound on items per date: `ceil(items / days)`.
    #[must_use]
    pub fn per_day(&self) -> usize {
        self.per_day
    }

    /// All items in document order.
    #[must_use]
    pub fn items(&self) -> &[RevisionItem] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<&RevisionItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Items for `date` in scheduled order; empty outside the range.
    #[must_use]
    pub fn items_on(&self, date: NaiveDate) -> Vec<&RevisionItem> {
        self.days
            .get(&date)
            .map(|bucket| bucket.iter().map(|&i| &self.items[i]).collect())
            .unwrap_or_default()
    }

    /// Like [`Self::items_on`], keyed by `YYYY-MM-DD`.
    #[must_use]
    pub fn items_on_key(&self, key: &str) -> Vec<&RevisionItem> {
        calendar::parse_date_key(key)
            .map(|date| self.items_on(date))
            .unwrap_or_default()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Every date of the range with its bucket, ascending.
    pub fn timeline(&self) -> impl Iterator<Item = DayPlan<'_>> + '_ {
        self.days.iter().map(|(&date, bucket)| DayPlan {
            date,
            items: bucket.iter().map(|&i| &self.items[i]).collect(),
        })
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> DayPlan<'_> {
        DayPlan {
            date,
            items: self.items_on(date),
        }
    }

    /// Case-insensitive substring match on the objective text or any
    /// ancestor title.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&RevisionItem> {
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                [
                    &item.objective,
                    &item.topic_title,
                    &item.subtopic_title,
                    &item.component_title,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }

    #[must_use]
    pub fn filter(&self, filter: &ItemFilter) -> Vec<&RevisionItem> {
        self.items.iter().filter(|item| filter.matches(item)).collect()
    }

    //
    // ─── STATISTICS ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn stats(&self, today: NaiveDate) -> ProgressStats {
        let total = self.items.len();
        let completed = self.completed_count();
        ProgressStats {
            total,
            completed,
            percentage: percentage(completed, total),
            streak: self.streak(today),
            difficulty: self.items.iter().map(|item| item.difficulty).collect(),
        }
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// Consecutive days ending at `today` whose scheduled items are all
    /// completed, walking back no further than the range start.
    ///
    /// Days with nothing scheduled count towards the streak.
    #[must_use]
    pub fn streak(&self, today: NaiveDate) -> usize {
        let start = self.range.start();
        let mut streak = 0;
        let mut day = today;
        while day >= start {
            if !self.day(day).is_completed() {
                break;
            }
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }

    /// Days left in the range as of `today`; negative once the range is over.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        self.range.len() as i64 - self.range.offset_of(today)
    }

    /// Index of `today` on the timeline, clamped to the range.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn timeline_position(&self, today: NaiveDate) -> usize {
        let last = self.range.len() - 1;
        let offset = self.range.offset_of(today).max(0) as usize;
        offset.min(last)
    }

    /// The Sunday-started week containing `date`.
    #[must_use]
    pub fn week_overview(&self, date: NaiveDate) -> Vec<DayPlan<'_>> {
        let sunday = calendar::week_start(date);
        (0..7)
            .map(|offset| self.day(sunday + Duration::days(offset)))
            .collect()
    }

    //
    // ─── MUTATION ──────────────────────────────────────────────────────────────
    //

    /// Mark an item completed and clear its review flag.
    ///
    /// Returns `false` when no item has this id.
    pub fn mark_completed(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let item = &mut self.items[i];
        item.completed = true;
        item.needs_review = false;
        true
    }

    /// Flag an item for review. Completed items may be flagged too.
    ///
    /// Returns `false` when no item has this id.
    pub fn mark_needs_review(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        self.items[i].needs_review = true;
        true
    }

    /// Complete every item scheduled on `date` and clear its review flag;
    /// returns how many items changed.
    pub fn mark_day_completed(&mut self, date: NaiveDate) -> usize {
        let Some(bucket) = self.days.get(&date) else {
            return 0;
        };
        let mut changed = 0;
        for &i in bucket {
            let item = &mut self.items[i];
            if !item.completed || item.needs_review {
                changed += 1;
            }
            item.completed = true;
            item.needs_review = false;
        }
        changed
    }

    /// Snapshot of the completion flags for persistence.
    #[must_use]
    pub fn progress_record(&self, now: DateTime<Utc>) -> ProgressRecord {
        ProgressRecord {
            completed: self
                .items
                .iter()
                .filter(|item| item.completed)
                .map(|item| item.id.clone())
                .collect(),
            needs_review: self
                .items
                .iter()
                .filter(|item| item.needs_review)
                .map(|item| item.id.clone())
                .collect(),
            last_updated: Some(now),
        }
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}
