//! Box rendering capability.
//!
//! Each [`BoxKind`] knows how to lay out its node as a list of primitive
//! [`Shape`]s. The shapes go to a [`Surface`], which is the drawing library's
//! side of the seam: it also measures text, so the title height a box records
//! in its node's header matches what the surface will actually draw.
//!
//! Coordinates are node-local and unscaled. Rectangles, frames, text and
//! images are placed by their top-left corner; ports by their centre.

use crate::definitions::{BoxKind, NodeKind};
use crate::graph::{Edge, EdgeId, Graph};
use crate::node::{Direction, Node};
use tracing::debug;

const TITLE_SIZE: f64 = 12.0;
const TITLE_TOP_PADDING: f64 = 0.6;
/// Widest a title may get, as a fraction of the box width.
const TITLE_WIDTH_RATIO: f64 = 0.8;
const LABEL_SIZE: f64 = 10.0;
const LABEL_PADDING_RATIO: f64 = 0.2;
/// Extra width of the viewport's rectangular port beyond the port radius.
const RECT_PORT_EXTRA: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub bold: bool,
}

impl FontSpec {
    pub fn monospace(size: f64) -> Self {
        Self {
            family: "Monospace".to_string(),
            size,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Horizontal alignment of a text relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Rounded background rectangle of a box.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
    },
    Port {
        node: String,
        port: String,
        direction: Direction,
        x: f64,
        y: f64,
        radius: f64,
    },
    /// The viewport's single input port, placed by its centre.
    RectPort {
        node: String,
        port: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        font: FontSpec,
        anchor: Anchor,
        scale: f64,
    },
    Image {
        node: String,
        payload: Option<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        scale_x: f64,
        scale_y: f64,
    },
    /// Unfilled square outline of a viewport.
    Frame {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// An edge, in canvas coordinates.
    Connector {
        edge: EdgeId,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
}

/// The drawing backend.
pub trait Surface {
    /// Unscaled `(width, height)` of a text drawn in `font`.
    fn measure_text(&self, text: &str, font: &FontSpec) -> (f64, f64);

    fn draw(&mut self, shape: Shape);

    /// Starts the group of one node box placed at `(left, top)` on the canvas.
    fn begin_group(&mut self, _name: &str, _left: f64, _top: f64) {}

    fn end_group(&mut self) {}
}

/// A surface that keeps every shape and measures text with fixed-width glyphs.
#[derive(Debug, Clone, Default)]
pub struct ShapeList {
    pub shapes: Vec<Shape>,
    /// Names of the groups opened so far, in order.
    pub groups: Vec<String>,
}

impl ShapeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for ShapeList {
    fn measure_text(&self, text: &str, font: &FontSpec) -> (f64, f64) {
        (text.chars().count() as f64 * font.size * 0.6, font.size * 1.2)
    }

    fn draw(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    fn begin_group(&mut self, name: &str, _left: f64, _top: f64) {
        self.groups.push(name.to_string());
    }
}

impl BoxKind {
    /// Records this variant's header contributions on `node` without drawing.
    ///
    /// Titled variants measure their title through the surface and record it
    /// as the `title` contribution; image variants record the image height as
    /// `image`. Port positions queried afterwards account for both.
    pub fn layout(self, node: &mut Node, surface: &dyn Surface) {
        if self == BoxKind::ImageBox {
            if let Some(height) = node.image().map(|slot| slot.height) {
                node.set_header_height("image", height);
            }
        }
        if matches!(self, BoxKind::LabelledBox | BoxKind::ImageBox) {
            let title = TitleMetrics::measure(node, surface);
            node.set_header_height("title", title.top + title.height * title.scale);
        }
    }

    /// Lays out `node` and draws it as this box variant.
    pub fn render(self, node: &mut Node, surface: &mut dyn Surface) {
        self.layout(node, &*surface);
        match self {
            BoxKind::NodeBox => draw_base(node, surface),
            BoxKind::LabelledBox => draw_labelled(node, surface),
            BoxKind::ImageBox => {
                draw_labelled(node, surface);
                draw_image(node, surface, false);
            }
            BoxKind::ViewportBox => draw_viewport(node, surface),
        }
    }
}

struct TitleMetrics {
    font: FontSpec,
    top: f64,
    height: f64,
    scale: f64,
}

impl TitleMetrics {
    /// Title placement: padded from the top and shrunk to fit the box.
    fn measure(node: &Node, surface: &dyn Surface) -> Self {
        let font = FontSpec::monospace(TITLE_SIZE).bold();
        let (width, height) = surface.measure_text(node.name(), &font);
        let allowed = node.geom.width * TITLE_WIDTH_RATIO;
        let scale = if width > allowed { allowed / width } else { 1.0 };
        Self {
            font,
            top: height * TITLE_TOP_PADDING,
            height,
            scale,
        }
    }
}

fn draw_base(node: &Node, surface: &mut dyn Surface) {
    surface.draw(Shape::Rect {
        x: 0.0,
        y: 0.0,
        width: node.geom.width,
        height: node.height(),
        radius: node.geom.smooth,
    });
    for direction in [Direction::Output, Direction::Input] {
        for port in node.visible_ports(direction) {
            let Some((x, y)) = node.port_position(port, direction) else {
                continue;
            };
            surface.draw(Shape::Port {
                node: node.name().to_string(),
                port: port.to_string(),
                direction,
                x,
                y,
                radius: node.geom.port_radius,
            });
        }
    }
}

fn draw_labelled(node: &Node, surface: &mut dyn Surface) {
    let title = TitleMetrics::measure(node, &*surface);
    draw_base(node, surface);
    surface.draw(Shape::Text {
        text: node.name().to_string(),
        x: node.geom.width / 2.0,
        y: title.top,
        font: title.font,
        anchor: Anchor::Middle,
        scale: title.scale,
    });

    let padding = node.geom.width * LABEL_PADDING_RATIO;
    let labels = node
        .outputs()
        .iter()
        .map(|port| (port, Direction::Output))
        .chain(node.inputs().iter().map(|port| (port, Direction::Input)));
    for (port, direction) in labels {
        let Some((x, y)) = node.port_position(port, direction) else {
            continue;
        };
        let (x, anchor) = match direction {
            Direction::Input => (x + padding, Anchor::Start),
            Direction::Output => (x - padding, Anchor::End),
        };
        surface.draw(Shape::Text {
            text: node.label(port).to_string(),
            x,
            y,
            font: FontSpec::monospace(LABEL_SIZE),
            anchor,
            scale: 1.0,
        });
    }
}

fn draw_image(node: &Node, surface: &mut dyn Surface, centred: bool) {
    let Some(slot) = node.image() else {
        return;
    };
    let (x, y) = if centred {
        (
            (node.geom.width - slot.width) / 2.0,
            (node.geom.width - slot.height) / 2.0,
        )
    } else {
        (
            (node.geom.width - slot.width) / 2.0 + node.image_left(),
            node.header_contribution("title"),
        )
    };
    surface.draw(Shape::Image {
        node: node.name().to_string(),
        payload: slot.payload.clone(),
        x,
        y,
        width: slot.width,
        height: slot.height,
        scale_x: slot.scale_x(),
        scale_y: slot.scale_y(),
    });
}

fn draw_viewport(node: &Node, surface: &mut dyn Surface) {
    let side = node.geom.width;
    surface.draw(Shape::Frame {
        x: 0.0,
        y: 0.0,
        width: side,
        height: side,
    });
    if let Some(port) = node.inputs().first() {
        surface.draw(Shape::RectPort {
            node: node.name().to_string(),
            port: port.clone(),
            x: 0.0,
            y: side / 2.0,
            width: node.geom.port_radius + RECT_PORT_EXTRA,
            height: side,
        });
    }
    draw_image(node, surface, true);
}

/// Canvas position where an edge attaches to a node's port.
///
/// Viewports have one centred port regardless of their input rows.
pub fn port_anchor(node: &Node, port: &str, direction: Direction) -> Option<(f64, f64)> {
    let (x, y) = if node.kind() == NodeKind::Viewport && direction == Direction::Input {
        node.has_input(port).then_some((0.0, node.geom.width / 2.0))?
    } else {
        node.port_position(port, direction)?
    };
    Some((node.geom.left + x, node.geom.top + y))
}

impl Graph {
    /// Draws every node box, then every edge connector.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        for idx in 0..self.nodes().len() {
            let node = &self.nodes()[idx];
            let kind = match self.definitions().boxtype(node.type_name()) {
                Ok(kind) => kind,
                Err(e) => {
                    debug!(
                        node = %node.name(),
                        error = %e,
                        "falling back to the node's own variant"
                    );
                    node.kind().box_kind()
                }
            };
            let (name, left, top) = (node.name().to_string(), node.geom.left, node.geom.top);

            surface.begin_group(&name, left, top);
            kind.render(self.node_at_mut(idx), surface);
            surface.end_group();
        }

        for edge in self.edges() {
            if let Some((x1, y1, x2, y2)) = self.connector_coords(edge) {
                surface.draw(Shape::Connector {
                    edge: edge.name().clone(),
                    x1,
                    y1,
                    x2,
                    y2,
                });
            }
        }
    }

    /// Canvas endpoints `(x1, y1, x2, y2)` of an edge's connector.
    pub fn connector_coords(&self, edge: &Edge) -> Option<(f64, f64, f64, f64)> {
        let src = self.nodes().iter().find(|n| n.name() == edge.src())?;
        let dest = self.nodes().iter().find(|n| n.name() == edge.dest())?;
        let (x1, y1) = port_anchor(src, edge.output(), Direction::Output)?;
        let (x2, y2) = port_anchor(dest, edge.input(), Direction::Input)?;
        Some((x1, y1, x2, y2))
    }
}
