//! Built-in lessons and learning paths.

use crate::domain::entities::learning::{LearningConcept, LearningPath, QuizQuestion};
use crate::domain::values::difficulty::Difficulty;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn question(id: &str, text: &str, options: &[&str], correct: usize, explanation: &str) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        question: text.to_string(),
        options: strings(options),
        correct_answer: correct,
        explanation: explanation.to_string(),
    }
}

pub fn builtin_concepts() -> Vec<LearningConcept> {
    vec![
        LearningConcept {
            id: "basics-intro".to_string(),
            name: "Trading Fundamentals".to_string(),
            description: "Introduction to financial markets and basic trading concepts".to_string(),
            difficulty: Difficulty::Beginner,
            prerequisites: vec![],
            estimated_time: 15,
            key_points: strings(&[
                "What is trading and investing",
                "Types of financial markets",
                "Basic market terminology",
                "Risk and reward concepts",
            ]),
            examples: strings(&[
                "Stock market example: Buying Apple shares",
                "Forex example: EUR/USD currency pair",
                "Commodity example: Gold trading",
            ]),
            quiz: Some(vec![question(
                "q1",
                "What is the primary difference between trading and investing?",
                &[
                    "Trading is short-term, investing is long-term",
                    "Trading is safer than investing",
                    "Investing requires more money",
                    "There is no difference",
                ],
                0,
                "Trading typically involves shorter time horizons and more frequent transactions, while investing focuses on long-term wealth building.",
            )]),
        },
        LearningConcept {
            id: "technical-analysis".to_string(),
            name: "Technical Analysis Basics".to_string(),
            description: "Learn to read charts and identify patterns".to_string(),
            difficulty: Difficulty::Beginner,
            prerequisites: strings(&["basics-intro"]),
            estimated_time: 25,
            key_points: strings(&[
                "Chart types and timeframes",
                "Support and resistance levels",
                "Trend identification",
                "Basic chart patterns",
            ]),
            examples: strings(&[
                "Identifying uptrend in AAPL stock",
                "Finding support level at $150",
                "Recognizing head and shoulders pattern",
            ]),
            quiz: Some(vec![question(
                "q1",
                "What does a support level represent?",
                &[
                    "A price level where buying interest is strong",
                    "The highest price a stock can reach",
                    "A technical indicator",
                    "A type of order",
                ],
                0,
                "Support levels are price points where demand is strong enough to prevent further price declines.",
            )]),
        },
        LearningConcept {
            id: "risk-management".to_string(),
            name: "Risk Management".to_string(),
            description: "Protect your capital with proper risk management".to_string(),
            difficulty: Difficulty::Intermediate,
            prerequisites: strings(&["basics-intro"]),
            estimated_time: 20,
            key_points: strings(&[
                "Position sizing",
                "Stop-loss orders",
                "Risk-reward ratios",
                "Portfolio diversification",
            ]),
            examples: strings(&[
                "2% rule: Never risk more than 2% per trade",
                "Setting stop-loss at 5% below entry",
                "3:1 risk-reward ratio example",
            ]),
            quiz: Some(vec![question(
                "q1",
                "What is the 2% rule in trading?",
                &[
                    "Never risk more than 2% of your account on a single trade",
                    "Always make 2% profit per trade",
                    "Trade only 2% of available stocks",
                    "Use 2% commission maximum",
                ],
                0,
                "The 2% rule helps preserve capital by limiting the maximum loss on any single trade to 2% of your total account value.",
            )]),
        },
        LearningConcept {
            id: "market-psychology".to_string(),
            name: "Market Psychology".to_string(),
            description: "Understand emotions and behavior in trading".to_string(),
            difficulty: Difficulty::Intermediate,
            prerequisites: strings(&["basics-intro", "risk-management"]),
            estimated_time: 18,
            key_points: strings(&[
                "Fear and greed cycles",
                "Cognitive biases",
                "Emotional discipline",
                "Market sentiment indicators",
            ]),
            examples: strings(&[
                "FOMO (Fear of Missing Out) in bull markets",
                "Panic selling during market crashes",
                "Confirmation bias in analysis",
            ]),
            quiz: None,
        },
        LearningConcept {
            id: "options-basics".to_string(),
            name: "Options Trading Fundamentals".to_string(),
            description: "Introduction to options contracts and strategies".to_string(),
            difficulty: Difficulty::Advanced,
            prerequisites: strings(&["technical-analysis", "risk-management"]),
            estimated_time: 30,
            key_points: strings(&[
                "Call and put options",
                "Option pricing factors",
                "Basic strategies",
                "Greeks (Delta, Gamma, Theta, Vega)",
            ]),
            examples: strings(&[
                "Buying a call option on TSLA",
                "Protective put strategy",
                "Covered call writing",
            ]),
            quiz: None,
        },
    ]
}

pub fn builtin_paths() -> Vec<LearningPath> {
    vec![
        LearningPath {
            id: "beginner-path".to_string(),
            name: "Complete Beginner".to_string(),
            description: "Start your trading journey from the very basics".to_string(),
            concepts: strings(&["basics-intro", "technical-analysis", "risk-management"]),
            difficulty: Difficulty::Beginner,
            estimated_duration: 60,
        },
        LearningPath {
            id: "intermediate-path".to_string(),
            name: "Intermediate Trader".to_string(),
            description: "Build on your foundation with advanced concepts".to_string(),
            concepts: strings(&["technical-analysis", "risk-management", "market-psychology"]),
            difficulty: Difficulty::Intermediate,
            estimated_duration: 63,
        },
        LearningPath {
            id: "advanced-path".to_string(),
            name: "Advanced Strategies".to_string(),
            description: "Master complex trading instruments and strategies".to_string(),
            concepts: strings(&["market-psychology", "options-basics"]),
            difficulty: Difficulty::Advanced,
            estimated_duration: 48,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_prerequisites_reference_known_concepts() {
        let concepts = builtin_concepts();
        let ids: HashSet<&str> = concepts.iter().map(|c| c.id.as_str()).collect();
        for c in &concepts {
            for p in &c.prerequisites {
                assert!(ids.contains(p.as_str()), "{} requires unknown {}", c.id, p);
            }
        }
        for path in builtin_paths() {
            for c in &path.concepts {
                assert!(ids.contains(c.as_str()), "{} lists unknown {}", path.id, c);
            }
        }
    }

    #[test]
    fn test_quiz_answers_are_in_range() {
        for c in builtin_concepts() {
            for q in c.quiz.unwrap_or_default() {
                assert!(q.correct_answer < q.options.len());
            }
        }
    }
}
