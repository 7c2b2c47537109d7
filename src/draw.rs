//! Winner selection among the distinct authors of a crawl.

use crate::models::{Comment, unique_authors};
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("winner count must be at least 1")]
    ZeroWinners,
    #[error("cannot draw {requested} winners from {available} participants")]
    NotEnoughParticipants { requested: usize, available: usize },
}

/// Pick `count` distinct authors uniformly at random.
///
/// Each author counts once no matter how many comments they left. The
/// result is in draw order (first entry is first place).
pub fn draw_winners<R: Rng + ?Sized>(
    comments: &[Comment],
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, DrawError> {
    if count == 0 {
        return Err(DrawError::ZeroWinners);
    }
    let mut participants = unique_authors(comments);
    if count > participants.len() {
        return Err(DrawError::NotEnoughParticipants {
            requested: count,
            available: participants.len(),
        });
    }

    participants.shuffle(rng);
    participants.truncate(count);
    Ok(participants)
}
