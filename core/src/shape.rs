use crate::engine::EngineError;
use crate::point::Point;

/// A filled closed polygon in world space. Immutable once built; the engine
/// keeps an append-only list with bulk clear only.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub vertices: Vec<Point>,
    pub fill_color: String,
    pub border_color: String,
}

impl Shape {
    pub fn new(
        vertices: Vec<Point>,
        fill_color: String,
        border_color: String,
    ) -> Result<Self, EngineError> {
        if vertices.len() < 3 {
            return Err(EngineError::DegenerateShape);
        }
        if vertices.iter().any(|vertex| !vertex.is_finite()) {
            return Err(EngineError::NonFinitePoint);
        }
        Ok(Self {
            vertices,
            fill_color,
            border_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_fewer_than_three_vertices() {
        let result = Shape::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            "#fff".to_string(),
            "#000".to_string(),
        );
        assert_eq!(result.unwrap_err(), EngineError::DegenerateShape);
    }

    #[test]
    fn rejects_non_finite_vertices() {
        let result = Shape::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(f64::NAN, 1.0),
            ],
            "#fff".to_string(),
            "#000".to_string(),
        );
        assert_eq!(result.unwrap_err(), EngineError::NonFinitePoint);
    }

    #[test]
    fn accepts_a_triangle() {
        let shape = Shape::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.5, 1.0),
            ],
            "#fff".to_string(),
            "#000".to_string(),
        )
        .unwrap();
        assert_eq!(shape.vertices.len(), 3);
    }
}
