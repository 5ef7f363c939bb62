use std::collections::HashMap;

use uuid::Uuid;

use hireai_backend::models::{Question, QuestionType};
use hireai_backend::services::scoring_service::{
    score_submission, AnswerScorer, HeuristicScorer,
};

fn question(kind: QuestionType, skill: &str, correct: Option<&str>) -> Question {
    Question {
        id: Uuid::new_v4(),
        job_id: Uuid::nil(),
        order_index: 0,
        question_type: kind,
        question: "Explain how database indexes speed up queries".into(),
        options: match kind {
            QuestionType::Mcq => vec!["a".into(), "b".into(), "c".into(), "d".into()],
            _ => vec![],
        },
        correct_answer: correct.map(str::to_string),
        skill: skill.into(),
        difficulty: "Medium".into(),
    }
}

struct FixedScorer(i32);

impl AnswerScorer for FixedScorer {
    fn score_subjective(&self, _q: &str, _a: &str) -> i32 {
        self.0
    }
    fn score_coding(&self, _q: &str, _a: &str) -> i32 {
        self.0
    }
}

#[test]
fn full_assessment_scores_end_to_end() {
    let questions = vec![
        question(QuestionType::Mcq, "SQL", Some("b")),
        question(QuestionType::Mcq, "SQL", Some("c")),
        question(QuestionType::Mcq, "React", Some("a")),
        question(QuestionType::Subjective, "SQL", None),
        question(QuestionType::Coding, "React", None),
    ];
    let mut answers = HashMap::new();
    answers.insert(questions[0].id, "b".to_string());
    answers.insert(questions[1].id, "c".to_string());
    answers.insert(questions[2].id, "d".to_string());
    answers.insert(questions[3].id, "indexes avoid full scans".to_string());
    answers.insert(questions[4].id, "function f() { return 1; }".to_string());

    let breakdown = score_submission(&questions, &answers, false, &FixedScorer(90));
    // 2 of 3 MCQs correct.
    assert_eq!(breakdown.mcq_score, 67);
    assert_eq!(breakdown.subjective_score, 90);
    assert_eq!(breakdown.coding_score, 90);
    // round(67*0.4 + 90*0.3 + 90*0.3)
    assert_eq!(breakdown.total_score, 81);
    assert!(breakdown.skill_scores.contains_key("SQL"));
    assert!(breakdown.skill_scores.contains_key("React"));
}

#[test]
fn mcq_matching_is_exact_string_equality() {
    let q = question(QuestionType::Mcq, "SQL", Some("b"));
    let id = q.id;
    let questions = vec![q];

    for wrong in ["B", " b", "b ", ""] {
        let answers = HashMap::from([(id, wrong.to_string())]);
        let breakdown = score_submission(&questions, &answers, false, &FixedScorer(0));
        assert_eq!(breakdown.mcq_score, 0, "answer {wrong:?} must not match");
    }

    let answers = HashMap::from([(id, "b".to_string())]);
    let breakdown = score_submission(&questions, &answers, false, &FixedScorer(0));
    assert_eq!(breakdown.mcq_score, 100);
}

#[test]
fn disqualified_submission_keeps_review_data() {
    let questions = vec![
        question(QuestionType::Mcq, "SQL", Some("b")),
        question(QuestionType::Subjective, "SQL", None),
    ];
    let answers = HashMap::from([
        (questions[0].id, "b".to_string()),
        (questions[1].id, "a real answer".to_string()),
    ]);

    let breakdown = score_submission(&questions, &answers, true, &FixedScorer(80));
    assert_eq!(breakdown.total_score, 0);
    assert_eq!(breakdown.mcq_score, 100);
    assert_eq!(breakdown.subjective_score, 80);
    assert!(breakdown.disqualified);
    assert!(!breakdown.skill_scores.is_empty());
}

#[test]
fn empty_submission_scores_zero_across_the_board() {
    let questions = vec![
        question(QuestionType::Mcq, "SQL", Some("b")),
        question(QuestionType::Subjective, "SQL", None),
        question(QuestionType::Coding, "SQL", None),
    ];
    let answers = HashMap::new();

    let breakdown = score_submission(&questions, &answers, false, &HeuristicScorer);
    assert_eq!(breakdown.total_score, 0);
    assert_eq!(breakdown.skill_scores["SQL"], 0);
}

#[test]
fn no_questions_yields_zeroes_not_division_errors() {
    let breakdown = score_submission(&[], &HashMap::new(), false, &HeuristicScorer);
    assert_eq!(breakdown.total_score, 0);
    assert!(breakdown.skill_scores.is_empty());
}

#[test]
fn heuristic_scorer_is_deterministic_over_repeats() {
    let questions = vec![
        question(QuestionType::Subjective, "SQL", None),
        question(QuestionType::Coding, "SQL", None),
    ];
    let answers = HashMap::from([
        (
            questions[0].id,
            "Indexes store sorted keys so queries avoid scanning every row. For example a btree."
                .to_string(),
        ),
        (
            questions[1].id,
            "function sum(xs) {\n  let total = 0;\n  for (const x of xs) total += x;\n  return total;\n}"
                .to_string(),
        ),
    ]);

    let runs: Vec<_> = (0..5)
        .map(|_| score_submission(&questions, &answers, false, &HeuristicScorer))
        .collect();
    assert!(runs.windows(2).all(|w| w[0] == w[1]));
}
