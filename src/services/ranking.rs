use rand::Rng;

/// Simulated participant count bounds for a mock exam.
const MIN_PARTICIPANTS: u32 = 150;
const MAX_PARTICIPANTS: u32 = 200;

/// Simulated standing of a finished mock exam. Purely motivational:
/// there is no persisted leaderboard behind it, the rank is drawn
/// client-side from fixed score bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockExamRanking {
    pub rank: u32,
    pub participants: u32,
}

/// Normalizes the score to a 0-50 scale and maps it to a rank band.
/// The thresholds are the contract; a full score always ranks first.
pub fn simulate_ranking<R: Rng>(score: usize, total_questions: usize, rng: &mut R) -> MockExamRanking {
    let participants = rng.gen_range(MIN_PARTICIPANTS..=MAX_PARTICIPANTS);

    let normalized = if total_questions == 0 {
        0.0
    } else {
        score as f64 / total_questions as f64 * 50.0
    };

    let rank = if normalized >= 50.0 {
        1
    } else if normalized >= 45.0 {
        rng.gen_range(2..=5)
    } else if normalized >= 40.0 {
        rng.gen_range(6..=15)
    } else if normalized >= 30.0 {
        rng.gen_range(16..=40)
    } else if normalized >= 20.0 {
        rng.gen_range(41..=75)
    } else {
        rng.gen_range(76..=participants)
    };

    MockExamRanking { rank, participants }
}

impl MockExamRanking {
    /// The encouragement line shown next to the simulated standing.
    pub fn message(&self) -> &'static str {
        if self.rank == 1 {
            return "Congratulations, you ranked first!";
        }
        let percentile = self.rank as f64 / self.participants as f64 * 100.0;
        if percentile <= 10.0 {
            "Top 10%. Excellent!"
        } else if percentile <= 25.0 {
            "In the first quarter. Very strong performance!"
        } else if percentile <= 50.0 {
            "In the first half. Keep up the effort!"
        } else {
            "Keep practicing to improve your ranking."
        }
    }
}
