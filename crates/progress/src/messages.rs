//! Encouragement shown next to goal progress.

use rand::seq::SliceRandom;
use vitals_core::GoalType;

/// Longer motivation messages for a goal type.
pub fn motivation_messages(goal_type: &GoalType) -> &'static [&'static str] {
    match goal_type {
        GoalType::WeightLoss => &[
            "Small steps lead to big progress. You're doing great.",
            "Consistency matters more than perfection.",
            "Each measurement brings you closer to your weight goal.",
        ],
        GoalType::MuscleGain => &[
            "Strength is built slowly. Stay committed.",
            "Progressive change is still progress.",
            "Fuel your body, trust the process.",
        ],
        GoalType::Maintenance => &[
            "Stability is a win. You're keeping things balanced.",
            "Maintaining your health is an achievement.",
            "Every check-in helps you stay on track.",
        ],
        GoalType::HeartHealth => &[
            "Your heart will thank you for every healthy choice.",
            "This journey is about long-term wellbeing.",
            "Slow improvements still count. Keep going.",
        ],
        GoalType::SleepImprovement => &[
            "Better sleep takes time. You're making the right moves.",
            "Rest is a form of progress.",
            "Small improvements in routine can change everything.",
        ],
        GoalType::StressReduction => &[
            "It's okay to take things one breath at a time.",
            "You're choosing calm, and that matters.",
            "Progress is not linear. Be gentle with yourself.",
        ],
        GoalType::DiabetesControl => &[
            "Every measurement helps you stay in control.",
            "You're looking after your future health. Keep it up.",
            "You're building healthier habits day by day.",
        ],
        GoalType::Other(_) => &[],
    }
}

/// Short hints for a goal type.
pub fn motivation_hints(goal_type: &GoalType) -> &'static [&'static str] {
    match goal_type {
        GoalType::WeightLoss => &[
            "Every step counts. Keep going!",
            "Consistency is stronger than intensity.",
        ],
        GoalType::MuscleGain => &[
            "Small increases add up over time!",
            "Your strength is building. Stay steady.",
        ],
        GoalType::Maintenance => &[
            "Balance is beautiful. Keep your rhythm!",
            "You're maintaining a strong foundation.",
        ],
        GoalType::HeartHealth => &[
            "Your heart appreciates every healthy choice.",
            "Steady habits lead to steady heart health.",
        ],
        GoalType::SleepImprovement => &[
            "Better sleep boosts everything. Keep at it.",
            "Your nights shape your days. Good progress.",
        ],
        GoalType::StressReduction => &[
            "Small moments of calm create big changes.",
            "Your well-being is growing, gently and steadily.",
        ],
        GoalType::DiabetesControl => &[
            "Stable glucose is a strong achievement.",
            "Every controlled reading is a win.",
        ],
        GoalType::Other(_) => &[],
    }
}

/// Pick one message uniformly at random; `""` for an empty list.
pub fn pick_message(list: &[&'static str]) -> &'static str {
    list.choose(&mut rand::thread_rng()).copied().unwrap_or("")
}
