use crate::game::{Action, Direction, Position};

/// Move that takes the head onto the first cell of `path`
///
/// The x axis is compared before the y axis. An empty path, or a first cell
/// equal to the head, yields `Action::Continue`.
pub fn next_direction(path: &[Position], head: Position) -> Action {
    let Some(&next) = path.first() else {
        return Action::Continue;
    };

    if next.x > head.x {
        Action::Move(Direction::Right)
    } else if next.x < head.x {
        Action::Move(Direction::Left)
    } else if next.y > head.y {
        Action::Move(Direction::Down)
    } else if next.y < head.y {
        Action::Move(Direction::Up)
    } else {
        Action::Continue
    }
}
