use super::{Direction, Node};
use crate::config::GeometryConfig;
use serde::{Deserialize, Serialize};

/// Canvas placement and sizing of a node box. Unscaled units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub port_radius: f64,
    /// Corner rounding radius.
    pub smooth: f64,
    /// Port spacing as a fraction of the width.
    pub port_gap_ratio: f64,
}

impl Geometry {
    pub fn from_config(config: &GeometryConfig) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: config.width,
            port_radius: config.port_radius,
            smooth: config.smooth,
            port_gap_ratio: config.port_gap_ratio,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::from_config(&GeometryConfig::default())
    }
}

impl Node {
    /// Row a port occupies. Output rows come first, input rows below them.
    pub fn row(&self, port: &str, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Input => self
                .inputs()
                .iter()
                .position(|p| p == port)
                .map(|idx| idx + self.outputs().len()),
            Direction::Output => self.outputs().iter().position(|p| p == port),
        }
    }

    pub fn maxrows(&self) -> usize {
        self.inputs().len() + self.outputs().len()
    }

    pub fn port_spacing(&self) -> f64 {
        self.geom.width * self.geom.port_gap_ratio
    }

    /// Height of the port block below the header.
    pub fn ports_height(&self) -> f64 {
        self.maxrows() as f64 * self.port_spacing()
    }

    /// Sum of every header contribution (title, image, ...).
    pub fn header_height(&self) -> f64 {
        self.header_heights.values().sum()
    }

    pub fn header_contribution(&self, part: &str) -> f64 {
        self.header_heights.get(part).copied().unwrap_or(0.0)
    }

    pub fn set_header_height(&mut self, part: &str, height: f64) {
        self.header_heights.insert(part.to_string(), height);
    }

    /// Total unscaled height of the box.
    pub fn height(&self) -> f64 {
        self.ports_height() + self.header_height()
    }

    /// Node-local position of a port's centre, `None` for an undeclared port.
    pub fn port_position(&self, port: &str, direction: Direction) -> Option<(f64, f64)> {
        let row = self.row(port, direction)?;
        let spacing = self.port_spacing();
        let y = self.header_height() + spacing / 2.0 + row as f64 * spacing;
        let x = match direction {
            Direction::Input => 0.0,
            Direction::Output => self.geom.width,
        };
        Some((x, y))
    }

    /// Ports that get a visual port circle, i.e. every port not in hidden mode.
    pub fn visible_ports(&self, direction: Direction) -> Vec<&str> {
        let ports = match direction {
            Direction::Input => self.inputs(),
            Direction::Output => self.outputs(),
        };
        ports
            .iter()
            .filter(|p| self.mode(p).has_port())
            .map(String::as_str)
            .collect()
    }

    /// Horizontal image offset, depending on which sides carry ports.
    pub fn image_left(&self) -> f64 {
        let has_inputs = !self.inputs().is_empty();
        let has_outputs = !self.outputs().is_empty();
        match (has_inputs, has_outputs) {
            (true, false) => self.geom.port_radius / 2.0,
            (true, true) => self.geom.port_radius / 4.0,
            _ => 0.0,
        }
    }
}
