use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::question::{Question, QuestionType};

/// Weight of each category in the total score.
const MCQ_WEIGHT: f64 = 0.40;
const SUBJECTIVE_WEIGHT: f64 = 0.30;
const CODING_WEIGHT: f64 = 0.30;

/// Every question contributes this many max points to its skill bucket.
const SKILL_UNIT: i64 = 100;

/// Scores free-text answers. The production implementation is a heuristic
/// rubric; an LLM-backed one must keep the same 0..=100 contract so the
/// deterministic pipeline around it stays testable.
#[cfg_attr(test, mockall::automock)]
pub trait AnswerScorer: Send + Sync {
    fn score_subjective(&self, question: &str, answer: &str) -> i32;
    fn score_coding(&self, question: &str, answer: &str) -> i32;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub mcq_score: i32,
    pub subjective_score: i32,
    pub coding_score: i32,
    pub total_score: i32,
    pub skill_scores: BTreeMap<String, i32>,
    pub disqualified: bool,
}

/// Computes the deterministic result for one submission.
///
/// Missing answers score as empty strings, never as errors. Disqualification
/// forces the total to zero but category scores are still computed and kept
/// for recruiter review.
pub fn score_submission(
    questions: &[Question],
    answers: &HashMap<Uuid, String>,
    disqualified: bool,
    scorer: &dyn AnswerScorer,
) -> ScoreBreakdown {
    let mut mcq_correct = 0i64;
    let mut mcq_total = 0i64;
    let mut subjective_sum = 0i64;
    let mut subjective_total = 0i64;
    let mut coding_sum = 0i64;
    let mut coding_total = 0i64;
    let mut skills: BTreeMap<String, (i64, i64)> = BTreeMap::new();

    for q in questions {
        let answer = answers.get(&q.id).map(String::as_str).unwrap_or("");
        let bucket = skills.entry(q.skill.clone()).or_insert((0, 0));
        bucket.1 += SKILL_UNIT;

        match q.question_type {
            QuestionType::Mcq => {
                mcq_total += 1;
                let correct = q
                    .correct_answer
                    .as_deref()
                    .is_some_and(|expected| expected == answer);
                if correct {
                    mcq_correct += 1;
                    bucket.0 += SKILL_UNIT;
                }
            }
            QuestionType::Subjective => {
                subjective_total += 1;
                let score = scorer.score_subjective(&q.question, answer).clamp(0, 100) as i64;
                subjective_sum += score;
                bucket.0 += score;
            }
            QuestionType::Coding => {
                coding_total += 1;
                let score = scorer.score_coding(&q.question, answer).clamp(0, 100) as i64;
                coding_sum += score;
                bucket.0 += score;
            }
        }
    }

    let mcq_score = percent(mcq_correct * 100, mcq_total);
    let subjective_score = percent(subjective_sum, subjective_total);
    let coding_score = percent(coding_sum, coding_total);

    let total_score = if disqualified {
        0
    } else {
        (mcq_score as f64 * MCQ_WEIGHT
            + subjective_score as f64 * SUBJECTIVE_WEIGHT
            + coding_score as f64 * CODING_WEIGHT)
            .round() as i32
    };

    let skill_scores = skills
        .into_iter()
        .map(|(skill, (earned, max))| {
            let pct = if max > 0 {
                ((earned as f64 / max as f64) * 100.0).round() as i32
            } else {
                0
            };
            (skill, pct)
        })
        .collect();

    ScoreBreakdown {
        mcq_score,
        subjective_score,
        coding_score,
        total_score,
        skill_scores,
        disqualified,
    }
}

fn percent(sum: i64, count: i64) -> i32 {
    if count > 0 {
        (sum as f64 / count as f64).round() as i32
    } else {
        0
    }
}

/// Deterministic rubric for free-text answers: rewards length, overlap with
/// the question's own vocabulary, and visible structure.
pub struct HeuristicScorer;

impl AnswerScorer for HeuristicScorer {
    fn score_subjective(&self, question: &str, answer: &str) -> i32 {
        if answer.trim().is_empty() {
            return 0;
        }

        let word_count = answer.split_whitespace().count();
        let mut score: i32 = match word_count {
            n if n >= 100 => 40,
            n if n >= 50 => 30,
            n if n >= 20 => 20,
            _ => 10,
        };

        let question_lower = question.to_lowercase();
        let keywords: Vec<&str> = question_lower
            .split_whitespace()
            .filter(|w| w.len() > 4)
            .collect();
        let answer_lower = answer.to_lowercase();
        let matches = keywords
            .iter()
            .filter(|kw| answer_lower.contains(*kw))
            .count();
        let relevance = if keywords.is_empty() {
            0.0
        } else {
            matches as f64 / keywords.len() as f64
        };
        score += (relevance * 35.0).round() as i32;

        if answer.contains('\n') || answer.contains(". ") {
            score += 10;
        }
        if answer.contains("example") || answer.contains("e.g.") || answer.contains("for instance")
        {
            score += 10;
        }
        if word_count >= 30 && relevance > 0.2 {
            score += 5;
        }

        score.min(100)
    }

    fn score_coding(&self, _question: &str, answer: &str) -> i32 {
        let code = answer.trim();
        if code.is_empty() {
            return 0;
        }

        let mut score: i32 = 0;

        if code.contains("function")
            || code.contains("=>")
            || code.contains("def ")
            || code.contains("const ")
        {
            score += 20;
        }

        let lines = code.lines().filter(|l| !l.trim().is_empty()).count();
        score += match lines {
            n if n >= 10 => 30,
            n if n >= 5 => 20,
            n if n >= 2 => 10,
            _ => 0,
        };

        if code.contains("if")
            || code.contains("for")
            || code.contains("while")
            || code.contains("switch")
        {
            score += 15;
        }

        if code.contains("return") {
            score += 10;
        }

        let constructs = [
            "map", "filter", "reduce", "forEach", "Object", "Array", "Set", "Map", "sort",
        ];
        let used = constructs.iter().filter(|c| code.contains(*c)).count() as i32;
        score += (used * 5).min(15);

        if code.contains("try")
            || code.contains("catch")
            || code.contains("throw")
            || code.contains("Error")
        {
            score += 10;
        }

        score.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq(id: Uuid, skill: &str, correct: &str) -> Question {
        Question {
            id,
            job_id: Uuid::nil(),
            order_index: 0,
            question_type: QuestionType::Mcq,
            question: "pick one".into(),
            options: vec!["a".into(), correct.into(), "c".into(), "d".into()],
            correct_answer: Some(correct.into()),
            skill: skill.into(),
            difficulty: "Medium".into(),
        }
    }

    fn free_text(id: Uuid, kind: QuestionType, skill: &str) -> Question {
        Question {
            id,
            job_id: Uuid::nil(),
            order_index: 0,
            question_type: kind,
            question: "explain something".into(),
            options: vec![],
            correct_answer: None,
            skill: skill.into(),
            difficulty: "Medium".into(),
        }
    }

    struct FixedScorer {
        subjective: i32,
        coding: i32,
    }

    impl AnswerScorer for FixedScorer {
        fn score_subjective(&self, _q: &str, _a: &str) -> i32 {
            self.subjective
        }
        fn score_coding(&self, _q: &str, _a: &str) -> i32 {
            self.coding
        }
    }

    #[test]
    fn weighted_total_matches_worked_example() {
        // 2 MCQ (one right), subjective scored 60, coding scored 80.
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let q3 = Uuid::new_v4();
        let q4 = Uuid::new_v4();
        let questions = vec![
            mcq(q1, "SQL", "b"),
            mcq(q2, "SQL", "b"),
            free_text(q3, QuestionType::Subjective, "React"),
            free_text(q4, QuestionType::Coding, "React"),
        ];
        let answers = HashMap::from([
            (q1, "b".to_string()),
            (q2, "a".to_string()),
            (q3, "long answer".to_string()),
            (q4, "code".to_string()),
        ]);
        let scorer = FixedScorer {
            subjective: 60,
            coding: 80,
        };

        let breakdown = score_submission(&questions, &answers, false, &scorer);
        assert_eq!(breakdown.mcq_score, 50);
        assert_eq!(breakdown.subjective_score, 60);
        assert_eq!(breakdown.coding_score, 80);
        assert_eq!(breakdown.total_score, 62);
    }

    #[test]
    fn disqualification_forces_total_to_zero_but_keeps_categories() {
        let q1 = Uuid::new_v4();
        let questions = vec![mcq(q1, "SQL", "b")];
        let answers = HashMap::from([(q1, "b".to_string())]);
        let scorer = FixedScorer {
            subjective: 0,
            coding: 0,
        };

        let breakdown = score_submission(&questions, &answers, true, &scorer);
        assert_eq!(breakdown.total_score, 0);
        assert_eq!(breakdown.mcq_score, 100);
        assert!(breakdown.disqualified);
    }

    #[test]
    fn empty_categories_score_zero() {
        let q1 = Uuid::new_v4();
        let questions = vec![mcq(q1, "SQL", "b")];
        let answers = HashMap::from([(q1, "b".to_string())]);
        let scorer = FixedScorer {
            subjective: 100,
            coding: 100,
        };

        let breakdown = score_submission(&questions, &answers, false, &scorer);
        assert_eq!(breakdown.subjective_score, 0);
        assert_eq!(breakdown.coding_score, 0);
        assert_eq!(breakdown.total_score, 40);
    }

    #[test]
    fn missing_answers_score_as_empty_not_error() {
        // Timeout path: 1 of 3 questions answered.
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let q3 = Uuid::new_v4();
        let questions = vec![
            mcq(q1, "SQL", "b"),
            mcq(q2, "SQL", "b"),
            free_text(q3, QuestionType::Subjective, "SQL"),
        ];
        let answers = HashMap::from([(q1, "b".to_string())]);

        let breakdown = score_submission(&questions, &answers, false, &HeuristicScorer);
        assert_eq!(breakdown.mcq_score, 50);
        assert_eq!(breakdown.subjective_score, 0);
    }

    #[test]
    fn skill_scores_aggregate_across_question_types() {
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let questions = vec![
            mcq(q1, "SQL", "b"),
            free_text(q2, QuestionType::Subjective, "SQL"),
        ];
        let answers = HashMap::from([(q1, "b".to_string()), (q2, "anything".to_string())]);
        let scorer = FixedScorer {
            subjective: 50,
            coding: 0,
        };

        let breakdown = score_submission(&questions, &answers, false, &scorer);
        // (100 + 50) / 200
        assert_eq!(breakdown.skill_scores.get("SQL"), Some(&75));
        assert_eq!(breakdown.skill_scores.len(), 1);
    }

    #[test]
    fn skill_scores_stay_within_bounds() {
        let q1 = Uuid::new_v4();
        let questions = vec![free_text(q1, QuestionType::Coding, "Rust")];
        let answers = HashMap::from([(q1, "x".to_string())]);
        // Collaborator returning out-of-contract values is clamped.
        let scorer = FixedScorer {
            subjective: 0,
            coding: 250,
        };

        let breakdown = score_submission(&questions, &answers, false, &scorer);
        let pct = breakdown.skill_scores["Rust"];
        assert!((0..=100).contains(&pct));
        assert_eq!(breakdown.coding_score, 100);
    }

    #[test]
    fn scoring_is_idempotent() {
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let questions = vec![
            mcq(q1, "SQL", "b"),
            free_text(q2, QuestionType::Subjective, "React"),
        ];
        let answers = HashMap::from([
            (q1, "b".to_string()),
            (q2, "a reasonable answer with some length. For example this.".to_string()),
        ]);

        let first = score_submission(&questions, &answers, false, &HeuristicScorer);
        let second = score_submission(&questions, &answers, false, &HeuristicScorer);
        assert_eq!(first, second);
    }

    #[test]
    fn mock_scorer_is_consulted_per_question() {
        let mut mock = MockAnswerScorer::new();
        mock.expect_score_subjective().times(2).return_const(70);
        mock.expect_score_coding().times(0);

        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let questions = vec![
            free_text(q1, QuestionType::Subjective, "SQL"),
            free_text(q2, QuestionType::Subjective, "SQL"),
        ];
        let answers = HashMap::new();

        let breakdown = score_submission(&questions, &answers, false, &mock);
        assert_eq!(breakdown.subjective_score, 70);
    }

    #[test]
    fn heuristic_subjective_rewards_length_and_relevance() {
        let question = "Explain the difference between processes and threads";
        assert_eq!(HeuristicScorer.score_subjective(question, ""), 0);

        let short = HeuristicScorer.score_subjective(question, "threads are lighter");
        let long = HeuristicScorer.score_subjective(
            question,
            &"processes have isolated memory while threads share it. ".repeat(20),
        );
        assert!(long > short);
        assert!(long <= 100);
    }

    #[test]
    fn heuristic_coding_rewards_structure() {
        let empty = HeuristicScorer.score_coding("q", "   ");
        assert_eq!(empty, 0);

        let code = "function findPairs(nums, target) {\n  const seen = new Set();\n  const out = [];\n  for (const n of nums) {\n    if (seen.has(target - n)) out.push([target - n, n].sort());\n    seen.add(n);\n  }\n  return out;\n}";
        let scored = HeuristicScorer.score_coding("q", code);
        assert!(scored >= 60);
        assert!(scored <= 100);
    }
}
