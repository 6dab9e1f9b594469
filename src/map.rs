use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};

use crate::common::Location;
use crate::error::{MapfError, MapfResult};

/// Static part of the world: grid bounds and obstacles.
#[derive(Debug, Clone)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    obstacles: HashSet<Location>,
}

impl Map {
    pub fn new(
        width: i32,
        height: i32,
        obstacles: impl IntoIterator<Item = Location>,
    ) -> MapfResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(MapfError::InvalidDimension { width, height });
        }

        let mut map = Map {
            width,
            height,
            obstacles: HashSet::new(),
        };
        for location in obstacles {
            if !map.in_bounds(location) {
                return Err(MapfError::ObstacleOutOfBounds {
                    location,
                    width,
                    height,
                });
            }
            map.obstacles.insert(location);
        }

        Ok(map)
    }

    /// Reads a MovingAI `.map` file. Row `y` of the grid section holds the
    /// cells `(0, y) .. (width - 1, y)`; `.` and `G` are passable.
    pub fn from_file(path: &str) -> MapfResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let mut header = |key: &str| -> MapfResult<String> {
            lines
                .next()
                .ok_or_else(|| MapfError::MalformedMap(format!("missing `{key}` line")))?
                .map_err(MapfError::from)
        };

        let _type = header("type")?;
        let height = parse_dimension(&header("height")?, "height")?;
        let width = parse_dimension(&header("width")?, "width")?;
        let _map = header("map")?;

        let mut obstacles = Vec::new();
        for y in 0..height {
            let row = header("grid row")?;
            let cells: Vec<char> = row.chars().collect();
            if cells.len() < width as usize {
                return Err(MapfError::MalformedMap(format!(
                    "row {y} has {} cells, expected {width}",
                    cells.len()
                )));
            }
            for (x, ch) in cells.into_iter().take(width as usize).enumerate() {
                if !matches!(ch, '.' | 'G') {
                    obstacles.push(Location::new(x as i32, y));
                }
            }
        }

        Map::new(width, height, obstacles)
    }

    pub fn in_bounds(&self, location: Location) -> bool {
        location.x >= 0 && location.x < self.width && location.y >= 0 && location.y < self.height
    }

    pub fn is_obstacle(&self, location: Location) -> bool {
        self.obstacles.contains(&location)
    }

    pub fn is_passable(&self, location: Location) -> bool {
        self.in_bounds(location) && !self.is_obstacle(location)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Location> {
        self.obstacles.iter()
    }

    /// Passable cells in row-major order.
    pub fn free_cells(&self) -> Vec<Location> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Location::new(x, y)))
            .filter(|location| !self.is_obstacle(*location))
            .collect()
    }
}

fn parse_dimension(line: &str, key: &str) -> MapfResult<i32> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(name), Some(value)) if name == key => value
            .parse::<i32>()
            .map_err(|err| MapfError::MalformedMap(format!("bad {key} {value:?}: {err}"))),
        _ => Err(MapfError::MalformedMap(format!(
            "expected `{key} <n>`, got {line:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_map_bounds_and_obstacles() {
        let map = Map::new(3, 2, vec![Location::new(1, 1)]).unwrap();

        assert!(map.in_bounds(Location::new(2, 1)));
        assert!(!map.in_bounds(Location::new(3, 0)));
        assert!(!map.in_bounds(Location::new(0, -1)));
        assert!(!map.is_passable(Location::new(1, 1)));
        assert!(map.is_passable(Location::new(0, 1)));
        assert_eq!(map.free_cells().len(), 5);
    }

    #[test]
    fn test_map_rejects_bad_input() {
        assert!(matches!(
            Map::new(0, 4, vec![]),
            Err(MapfError::InvalidDimension { .. })
        ));
        assert!(matches!(
            Map::new(2, 2, vec![Location::new(2, 0)]),
            Err(MapfError::ObstacleOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_read_map() {
        let path = std::env::temp_dir().join("grid_cbs_test_read_map.map");
        let mut file = File::create(&path).unwrap();
        write!(file, "type octile\nheight 3\nwidth 4\nmap\n....\n.@@.\nT..G\n").unwrap();
        drop(file);

        let map = Map::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(map.height, 3);
        assert_eq!(map.width, 4);

        assert!(map.is_passable(Location::new(0, 0)));
        assert!(!map.is_passable(Location::new(1, 1)));
        assert!(!map.is_passable(Location::new(2, 1)));
        assert!(!map.is_passable(Location::new(0, 2)));
        assert!(map.is_passable(Location::new(3, 2)));
        assert_eq!(map.free_cells().len(), 9);
    }

    #[test]
    fn test_read_truncated_map() {
        let path = std::env::temp_dir().join("grid_cbs_test_truncated.map");
        let mut file = File::create(&path).unwrap();
        write!(file, "type octile\nheight 3\nwidth 4\nmap\n....\n").unwrap();
        drop(file);

        assert!(matches!(
            Map::from_file(path.to_str().unwrap()),
            Err(MapfError::MalformedMap(_))
        ));
    }
}
