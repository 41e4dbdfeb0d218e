//! Style model: per-box visual attributes, pattern-matched rules, and the
//! cascade that resolves them.
//!
//! Resolution order for one box, ascending priority:
//! 1. `Style::default()`
//! 2. sheet rules whose pattern matches, applied in ascending specificity
//!    (a tag/pseudo match loses to an id match; ties apply in declaration
//!    order)
//! 3. box-local overrides declared by the caller
//!
//! Color values may name a configuration key instead of a literal; keys are
//! resolved through a [`ConfigSource`] at style-application time, so a theme
//! edit shows up on the next frame without re-declaring anything.

use crate::font::FontId;
use crate::geom::{Axis, Rgba, CLEAR, WHITE};

/// Bit flags marking which style attributes animate toward newly declared
/// values instead of snapping.
pub mod anim {
    pub const BACKGROUND: u32 = 1 << 0;
    pub const FOREGROUND: u32 = 1 << 1;
    pub const BORDER_COLOR: u32 = 1 << 2;
    pub const BORDER_WIDTH: u32 = 1 << 3;
    pub const RADIUS: u32 = 1 << 4;

    pub const ALL: u32 = BACKGROUND | FOREGROUND | BORDER_COLOR | BORDER_WIDTH | RADIUS;
}

/// How a box is sized along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SizeSpec {
    /// Literal pixel size.
    Pixels(f32),
    /// Fraction of the parent's resolved size, in 0.0-1.0.
    PctParent(f32),
    /// Sum of children along the stacking axis (max along the cross axis),
    /// plus padding.
    #[default]
    ChildrenSum,
    /// Deferred to the box kind's measure capability (text and images,
    /// whose extent depends on glyph or bitmap metrics).
    Custom,
}

/// A color that is either a literal or a named configuration key.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    Value(Rgba),
    Key(String),
}

impl ColorSpec {
    /// Resolves to a concrete color. Unknown keys (or no config wired up)
    /// fall back to transparent, which reads as "unstyled" rather than
    /// failing the frame.
    pub fn resolve(&self, cfg: Option<&dyn ConfigSource>) -> Rgba {
        match self {
            ColorSpec::Value(c) => *c,
            ColorSpec::Key(key) => cfg.and_then(|c| c.color(key)).unwrap_or(CLEAR),
        }
    }
}

/// Named-value lookup used by the style system.
///
/// The config store implements this; tests can provide a stub.
pub trait ConfigSource {
    fn color(&self, key: &str) -> Option<Rgba>;
    fn number(&self, key: &str) -> Option<f64>;
}

/// Fully resolved style for one box.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub background: Rgba,
    pub foreground: Rgba,
    pub border_color: Rgba,
    pub border_width: f32,
    pub radius: f32,
    pub shadow: f32,
    /// Inner padding applied on all sides.
    pub padding: f32,
    /// Gap between consecutive in-flow children.
    pub spacing: f32,
    /// Axis along which children stack.
    pub direction: Axis,
    /// Size specs indexed by [`Axis::idx`].
    pub size: [SizeSpec; 2],
    pub font: FontId,
    /// Attributes that interpolate; see [`anim`].
    pub animation_mask: u32,
    /// Seconds for an animated attribute to reach its target.
    pub animation_duration: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: CLEAR,
            foreground: WHITE,
            border_color: CLEAR,
            border_width: 0.0,
            radius: 0.0,
            shadow: 0.0,
            padding: 0.0,
            spacing: 0.0,
            direction: Axis::Y,
            size: [SizeSpec::ChildrenSum, SizeSpec::ChildrenSum],
            font: 0,
            animation_mask: 0,
            animation_duration: 0.15,
        }
    }
}

/// A partial style: rule payload or box-local overrides. Unset fields leave
/// the target untouched.
#[derive(Debug, Clone, Default)]
pub struct StylePatch {
    pub background: Option<ColorSpec>,
    pub foreground: Option<ColorSpec>,
    pub border_color: Option<ColorSpec>,
    pub border_width: Option<f32>,
    pub radius: Option<f32>,
    pub shadow: Option<f32>,
    pub padding: Option<f32>,
    pub spacing: Option<f32>,
    pub direction: Option<Axis>,
    pub size_x: Option<SizeSpec>,
    pub size_y: Option<SizeSpec>,
    pub font: Option<FontId>,
    pub animation_mask: Option<u32>,
    pub animation_duration: Option<f32>,
}

impl StylePatch {
    /// Applies set fields onto `style`, resolving color keys through `cfg`.
    pub fn apply_to(&self, style: &mut Style, cfg: Option<&dyn ConfigSource>) {
        if let Some(c) = &self.background {
            style.background = c.resolve(cfg);
        }
        if let Some(c) = &self.foreground {
            style.foreground = c.resolve(cfg);
        }
        if let Some(c) = &self.border_color {
            style.border_color = c.resolve(cfg);
        }
        if let Some(v) = self.border_width {
            style.border_width = v;
        }
        if let Some(v) = self.radius {
            style.radius = v;
        }
        if let Some(v) = self.shadow {
            style.shadow = v;
        }
        if let Some(v) = self.padding {
            style.padding = v;
        }
        if let Some(v) = self.spacing {
            style.spacing = v;
        }
        if let Some(v) = self.direction {
            style.direction = v;
        }
        if let Some(v) = self.size_x {
            style.size[Axis::X.idx()] = v;
        }
        if let Some(v) = self.size_y {
            style.size[Axis::Y.idx()] = v;
        }
        if let Some(v) = self.font {
            style.font = v;
        }
        if let Some(v) = self.animation_mask {
            style.animation_mask = v;
        }
        if let Some(v) = self.animation_duration {
            style.animation_duration = v;
        }
    }
}

/// Positional pseudo-selector, evaluated against a box's index among its
/// siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    First,
    Last,
    Odd,
    Even,
}

/// What a rule matches against. All set components must match.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    /// Box kind tag ("button", "label", ...).
    pub tag: Option<String>,
    /// The id the box was declared with.
    pub id: Option<String>,
    pub pseudo: Option<Pseudo>,
}

impl Pattern {
    /// Matches against a box's tag, id, and sibling position.
    pub fn matches(&self, ctx: &MatchContext<'_>) -> bool {
        if let Some(tag) = &self.tag {
            if tag != ctx.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if id != ctx.id {
                return false;
            }
        }
        if let Some(pseudo) = self.pseudo {
            let ok = match pseudo {
                Pseudo::First => ctx.child_index == 0,
                Pseudo::Last => ctx.child_index + 1 == ctx.sibling_count,
                Pseudo::Odd => ctx.child_index % 2 == 1,
                Pseudo::Even => ctx.child_index % 2 == 0,
            };
            if !ok {
                return false;
            }
        }
        true
    }

    /// Ordering weight: id matches dominate tag matches, which dominate
    /// bare pseudo-selectors.
    pub fn specificity(&self) -> u32 {
        let mut s = 0;
        if self.id.is_some() {
            s += 4;
        }
        if self.tag.is_some() {
            s += 2;
        }
        if self.pseudo.is_some() {
            s += 1;
        }
        s
    }
}

/// The attributes a box offers for pattern matching.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub tag: &'a str,
    pub id: &'a str,
    /// Index among in-flow siblings, 0-based.
    pub child_index: usize,
    pub sibling_count: usize,
}

/// One rule of the global sheet.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub pattern: Pattern,
    pub patch: StylePatch,
}

/// The global rule set consulted for every declared box.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    rules: Vec<StyleRule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, pattern: Pattern, patch: StylePatch) {
        self.rules.push(StyleRule { pattern, patch });
    }

    /// Resolves the cascade for one box: defaults, then matching rules in
    /// ascending specificity. Local overrides are applied by the caller on
    /// top of the result.
    pub fn resolve(&self, ctx: &MatchContext<'_>, cfg: Option<&dyn ConfigSource>) -> Style {
        let mut style = Style::default();
        let mut matched: Vec<&StyleRule> =
            self.rules.iter().filter(|r| r.pattern.matches(ctx)).collect();
        // Stable sort: equal specificity applies in declaration order.
        matched.sort_by_key(|r| r.pattern.specificity());
        for rule in matched {
            rule.patch.apply_to(&mut style, cfg);
        }
        style
    }
}

// ==================== Animation ====================

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    [
        lerp(a[0], b[0], t),
        lerp(a[1], b[1], t),
        lerp(a[2], b[2], t),
        lerp(a[3], b[3], t),
    ]
}

/// Advances `current` toward `target` by one frame of `dt` seconds.
///
/// Attributes in the target's animation mask interpolate over the configured
/// duration; everything else snaps. The target's non-animatable fields
/// (size, direction, font, ...) always snap.
pub fn animate_style(current: &mut Style, target: &Style, dt: f32) {
    let mask = target.animation_mask;
    let t = if target.animation_duration > 0.0 {
        (dt / target.animation_duration).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let blended_background = lerp_color(current.background, target.background, t);
    let blended_foreground = lerp_color(current.foreground, target.foreground, t);
    let blended_border_color = lerp_color(current.border_color, target.border_color, t);
    let blended_border_width = lerp(current.border_width, target.border_width, t);
    let blended_radius = lerp(current.radius, target.radius, t);

    *current = target.clone();
    if mask & anim::BACKGROUND != 0 {
        current.background = blended_background;
    }
    if mask & anim::FOREGROUND != 0 {
        current.foreground = blended_foreground;
    }
    if mask & anim::BORDER_COLOR != 0 {
        current.border_color = blended_border_color;
    }
    if mask & anim::BORDER_WIDTH != 0 {
        current.border_width = blended_border_width;
    }
    if mask & anim::RADIUS != 0 {
        current.radius = blended_radius;
    }
}
