use quiz_core::model::StatisticsSnapshot;
use quiz_core::time::date_time_string;

use super::display::QuizResultsView;

/// Composes the end-of-round summary from this round's score and the updated totals.
#[must_use]
pub fn results_view(correct: u32, amount: u32, stats: &StatisticsSnapshot) -> QuizResultsView {
    let record = stats.best_game.map_or_else(
        || "Record: none".to_string(),
        |best| {
            format!(
                "Record: {}/{} ({})",
                best.correct(),
                best.total(),
                date_time_string(best.date())
            )
        },
    );
    let message = [
        format!("Your result: {correct}/{amount}"),
        format!("Quizzes played: {}", stats.games_count),
        record,
        format!("Accuracy: {:.2}%", stats.total_accuracy),
    ]
    .join("\n");

    QuizResultsView {
        title: "This round is over!".into(),
        message,
        button_text: "Play again".into(),
    }
}
