// src/utils/aggregate.rs

//! Frequency distributions and dashboard figures, computed fresh from the
//! stored records on every request.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{
    question::{Catalog, Question, QuestionKind},
    response::ResponseRecord,
};

/// Counts how often each option of `question` was selected.
///
/// Single-choice answers count once per record; multi-choice answers count
/// once per selected label. Labels outside the question's options, missing
/// answers and zero counts are left out.
///
/// Single-choice results keep catalog option order (pie legend order).
/// Multi-choice results are sorted by ascending count, ties by label, so a
/// horizontal bar chart ends up with the largest bar on top.
pub fn frequency(records: &[ResponseRecord], question: &Question) -> Vec<(String, u64)> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for record in records {
        if let Some(answer) = record.answers.get(&question.id) {
            for label in answer.labels() {
                *counts.entry(label).or_insert(0) += 1;
            }
        }
    }

    let mut distribution: Vec<(String, u64)> = question
        .options
        .iter()
        .filter_map(|option| {
            counts
                .get(option.as_str())
                .map(|count| (option.clone(), *count))
        })
        .collect();

    if question.kind == QuestionKind::MultiChoice {
        distribution.sort_by(|(a_label, a_count), (b_label, b_count)| {
            a_count.cmp(b_count).then_with(|| a_label.cmp(b_label))
        });
    }

    distribution
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Pie,
    Bar,
}

#[derive(Debug, Serialize)]
pub struct ChartEntry {
    pub label: String,
    /// Option letter, used for compact axis ticks (e.g. "A" for "A. ChatGPT").
    pub short_label: String,
    pub count: u64,
}

/// One chart per question, ready for a charting front-end.
#[derive(Debug, Serialize)]
pub struct Chart {
    pub question_id: String,
    pub title: String,
    pub kind: ChartKind,
    pub entries: Vec<ChartEntry>,
}

fn short_label(label: &str) -> &str {
    label.split('.').next().unwrap_or(label).trim()
}

pub fn charts(records: &[ResponseRecord], catalog: &Catalog) -> Vec<Chart> {
    catalog
        .all()
        .iter()
        .map(|question| Chart {
            question_id: question.id.clone(),
            title: question.title.clone(),
            kind: match question.kind {
                QuestionKind::SingleChoice => ChartKind::Pie,
                QuestionKind::MultiChoice => ChartKind::Bar,
            },
            entries: frequency(records, question)
                .into_iter()
                .map(|(label, count)| ChartEntry {
                    short_label: short_label(&label).to_string(),
                    label,
                    count,
                })
                .collect(),
        })
        .collect()
}

/// Headline figures for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Name on the newest record, if any.
    pub latest_respondent: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Expects `records` in store order (newest first).
pub fn summary(records: &[ResponseRecord]) -> Summary {
    Summary {
        total: records.len(),
        latest_respondent: records.first().map(|r| r.respondent_name.clone()),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::{Answer, Answers};
    use std::collections::BTreeSet;

    fn record(id: i64, answers: &[(&str, Answer)]) -> ResponseRecord {
        ResponseRecord {
            id,
            respondent_name: format!("r{id}"),
            submitted_at: Utc::now(),
            answers: answers
                .iter()
                .map(|(q, a)| (q.to_string(), a.clone()))
                .collect::<Answers>(),
        }
    }

    fn multi(labels: &[&str]) -> Answer {
        Answer::Multi(labels.iter().map(|l| l.to_string()).collect::<BTreeSet<_>>())
    }

    fn single(label: &str) -> Answer {
        Answer::Single(label.to_string())
    }

    const Q2_A: &str = "A. 教学设计与教案";
    const Q2_B: &str = "B. 课件与素材制作";
    const Q2_C: &str = "C. 文档处理与办公效率";

    #[test]
    fn multi_choice_counts_each_selected_label() {
        let catalog = Catalog::standard();
        let records = vec![
            record(1, &[("q2", multi(&[Q2_A, Q2_B]))]),
            record(2, &[("q2", multi(&[Q2_B]))]),
            record(3, &[("q2", multi(&[Q2_A, Q2_C]))]),
        ];

        let distribution = frequency(&records, catalog.get("q2").unwrap());
        assert_eq!(
            distribution,
            vec![
                (Q2_C.to_string(), 1),
                (Q2_A.to_string(), 2),
                (Q2_B.to_string(), 2),
            ]
        );
    }

    #[test]
    fn single_choice_keeps_option_order_and_skips_missing() {
        let catalog = Catalog::standard();
        let records = vec![
            record(1, &[("q1", single("E. 非常熟练"))]),
            record(2, &[("q1", single("A. 完全不了解"))]),
            record(3, &[("q1", single("E. 非常熟练"))]),
            record(4, &[]),
            record(5, &[("q1", single("Z. legacy value"))]),
        ];

        let distribution = frequency(&records, catalog.get("q1").unwrap());
        assert_eq!(
            distribution,
            vec![
                ("A. 完全不了解".to_string(), 1),
                ("E. 非常熟练".to_string(), 2),
            ]
        );
    }

    #[test]
    fn no_records_means_empty_distribution() {
        let catalog = Catalog::standard();
        for question in catalog.all() {
            assert!(frequency(&[], question).is_empty());
        }
    }

    #[test]
    fn charts_follow_catalog_with_kind_per_question() {
        let catalog = Catalog::standard();
        let records = vec![record(1, &[("q4", multi(&["L. DeepSeek"]))])];

        let charts = charts(&records, &catalog);
        let kinds: Vec<ChartKind> = charts.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            [
                ChartKind::Pie,
                ChartKind::Bar,
                ChartKind::Bar,
                ChartKind::Bar,
                ChartKind::Pie,
                ChartKind::Pie
            ]
        );
        assert_eq!(charts[3].entries[0].short_label, "L");
        assert_eq!(charts[3].entries[0].count, 1);
    }

    #[test]
    fn summary_reports_newest_respondent() {
        let records = vec![record(2, &[]), record(1, &[])];
        let summary = summary(&records);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.latest_respondent.as_deref(), Some("r2"));

        assert_eq!(super::summary(&[]).latest_respondent, None);
    }
}
