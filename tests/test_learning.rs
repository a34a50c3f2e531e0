use tradepilot::application::learning_system::LearningSystem;
use tradepilot::domain::error::DomainError;
use tradepilot::domain::values::difficulty::Difficulty;
use tradepilot::domain::values::progress_status::ProgressStatus;

fn ids(concepts: &[tradepilot::domain::entities::learning::LearningConcept]) -> Vec<&str> {
    concepts.iter().map(|c| c.id.as_str()).collect()
}

#[test]
fn test_catalog_lookup() {
    let ls = LearningSystem::new();
    assert_eq!(ls.all_concepts().len(), 5);
    assert_eq!(ls.all_learning_paths().len(), 3);
    assert_eq!(ls.get_concept("basics-intro").unwrap().name, "Trading Fundamentals");
    assert!(ls.get_concept("nope").is_none());
    assert!(ls.get_learning_path("beginner-path").is_some());

    let beginner: Vec<&str> = ls
        .concepts_by_difficulty(Difficulty::Beginner)
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(beginner, vec!["basics-intro", "technical-analysis"]);
}

#[test]
fn test_quiz_score_is_running_percentage() {
    let ls = LearningSystem::new();

    let first = ls.submit_quiz_answer("u1", "basics-intro", "q1", 0).unwrap();
    assert!(first.correct);
    assert_eq!(first.score, 100);

    let second = ls.submit_quiz_answer("u1", "basics-intro", "q1", 2).unwrap();
    assert!(!second.correct);
    assert_eq!(second.score, 50);
    assert!(!second.explanation.is_empty());

    let progress = ls.get_user_progress("u1", "basics-intro").unwrap().unwrap();
    assert_eq!(progress.attempts, 2);
    assert_eq!(progress.correct_answers, 1);
    assert_eq!(progress.total_questions, 2);
    assert_eq!(progress.status, ProgressStatus::InProgress);
}

#[test]
fn test_quiz_unknown_question() {
    let ls = LearningSystem::new();
    assert!(matches!(
        ls.submit_quiz_answer("u1", "basics-intro", "q9", 0),
        Err(DomainError::NotFound(_))
    ));
    // market-psychology has no quiz
    assert!(matches!(
        ls.submit_quiz_answer("u1", "market-psychology", "q1", 0),
        Err(DomainError::NotFound(_))
    ));
}

#[test]
fn test_completion_status_depends_on_score() {
    let ls = LearningSystem::new();
    let done = ls.complete_concept("u1", "basics-intro", 70).unwrap();
    assert_eq!(done.status, ProgressStatus::Completed);

    let mastered = ls.complete_concept("u1", "technical-analysis", 80).unwrap();
    assert_eq!(mastered.status, ProgressStatus::Mastered);

    assert!(matches!(ls.start_concept("u1", "nope"), Err(DomainError::NotFound(_))));
}

#[test]
fn test_recommendations_follow_prerequisites() {
    let ls = LearningSystem::new();

    // Nothing finished: only the entry concept is open.
    assert_eq!(ids(&ls.recommended_concepts("u1").unwrap()), vec!["basics-intro"]);

    ls.complete_concept("u1", "basics-intro", 90).unwrap();
    assert_eq!(
        ids(&ls.recommended_concepts("u1").unwrap()),
        vec!["technical-analysis", "risk-management"]
    );

    ls.complete_concept("u1", "risk-management", 60).unwrap();
    assert_eq!(
        ids(&ls.recommended_concepts("u1").unwrap()),
        vec!["technical-analysis", "risk-management", "market-psychology"]
    );
}

#[test]
fn test_overall_progress() {
    let ls = LearningSystem::new();
    ls.start_concept("u1", "basics-intro").unwrap();
    ls.complete_concept("u1", "technical-analysis", 90).unwrap();
    ls.complete_concept("u1", "risk-management", 60).unwrap();

    let overall = ls.overall_progress("u1").unwrap();
    assert_eq!(overall.total_concepts, 5);
    assert_eq!(overall.completed_concepts, 2);
    assert_eq!(overall.mastered_concepts, 1);
    assert_eq!(overall.average_score, 50);

    assert_eq!(ls.all_user_progress("u1").unwrap().len(), 3);
    assert_eq!(ls.overall_progress("u2").unwrap().average_score, 0);
}
