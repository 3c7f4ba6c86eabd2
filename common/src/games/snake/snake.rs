use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::types::Point;

/// Snake body, head first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snake {
    body: VecDeque<Point>,
}

impl Snake {
    /// Horizontal snake with its head at `head` and the body trailing to the left.
    pub fn horizontal(head: Point, length: usize) -> Self {
        let body = (0..length.max(1))
            .map(|i| Point::new(head.x - i as i32, head.y))
            .collect();
        Self { body }
    }

    #[cfg(test)]
    pub fn from_segments(segments: impl IntoIterator<Item = Point>) -> Self {
        let body: VecDeque<Point> = segments.into_iter().collect();
        assert!(!body.is_empty(), "Snake needs at least one segment");
        Self { body }
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn tail(&self) -> Point {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Point> {
        self.body.iter()
    }

    pub fn contains(&self, pos: Point) -> bool {
        self.body.contains(&pos)
    }

    /// Collision against every segment except the head slot.
    pub fn collides_with_body(&self, pos: Point) -> bool {
        self.body.iter().skip(1).any(|segment| *segment == pos)
    }

    pub fn occupied(&self) -> HashSet<Point> {
        self.body.iter().copied().collect()
    }

    /// Returns the snake advanced to `new_head`; the tail is kept when `grow` is set.
    pub fn advanced(&self, new_head: Point, grow: bool) -> Self {
        let mut body = self.body.clone();
        body.push_front(new_head);
        if !grow {
            body.pop_back();
        }
        Self { body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_creation() {
        let snake = Snake::horizontal(Point::new(10, 10), 3);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Point::new(10, 10));
        let segments: Vec<Point> = snake.segments().copied().collect();
        assert_eq!(
            segments,
            vec![Point::new(10, 10), Point::new(9, 10), Point::new(8, 10)]
        );
        assert_eq!(snake.tail(), Point::new(8, 10));
    }

    #[test]
    fn test_advance_without_growth() {
        let snake = Snake::horizontal(Point::new(5, 5), 3);
        let moved = snake.advanced(Point::new(6, 5), false);
        assert_eq!(moved.len(), 3);
        assert_eq!(moved.head(), Point::new(6, 5));
        assert_eq!(moved.tail(), Point::new(4, 5));
        assert_eq!(snake.head(), Point::new(5, 5));
    }

    #[test]
    fn test_advance_with_growth() {
        let snake = Snake::horizontal(Point::new(5, 5), 3);
        let grown = snake.advanced(Point::new(6, 5), true);
        assert_eq!(grown.len(), 4);
        assert_eq!(grown.tail(), Point::new(3, 5));
    }

    #[test]
    fn test_body_collision_ignores_head() {
        let snake = Snake::horizontal(Point::new(5, 5), 3);
        assert!(!snake.collides_with_body(Point::new(5, 5)));
        assert!(snake.collides_with_body(Point::new(4, 5)));
        assert!(snake.collides_with_body(Point::new(3, 5)));
        assert!(!snake.collides_with_body(Point::new(10, 10)));
    }

    #[test]
    fn test_serializes_as_point_list() {
        let snake = Snake::horizontal(Point::new(2, 1), 2);
        let yaml = serde_yaml_ng::to_string(&snake).unwrap();
        let back: Snake = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, snake);
    }
}
