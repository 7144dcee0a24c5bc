/// Points needed per level; level is `score / LEVEL_SCORE_STEP + 1`.
pub const LEVEL_SCORE_STEP: u32 = 1000;

/// Default seconds without a hit before the combo resets.
pub const COMBO_IDLE_TIMEOUT_SECS: f64 = 3.0;

const POINTS_PER_CHAR: f64 = 10.0;

/// Points for hitting a word. `combo` is the streak before this hit counts.
pub fn points_for(word_len: usize, combo: u32, level: u32) -> u32 {
    let mut points = word_len as f64 * POINTS_PER_CHAR;
    if combo > 1 {
        points *= 1.0 + combo as f64 * 0.1;
    }
    points *= 1.0 + level as f64 * 0.05;
    points.round() as u32
}

pub fn level_from_score(score: u32, step: u32) -> u32 {
    score / step.max(1) + 1
}

pub fn score_to_next_level(score: u32, step: u32) -> u32 {
    let step = step.max(1);
    let next = level_from_score(score, step) * step;
    next - score
}
