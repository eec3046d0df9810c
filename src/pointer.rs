//! Pointer frame coalescing.
//!
//! The compositor reports pointer state one field at a time (position,
//! button, per-axis scroll values, scroll source) and closes each logical
//! update with a frame event. [`PointerFrameAggregator`] collects those
//! fragments and turns each frame into one immutable [`PointerSnapshot`].
//!
//! Only fields touched since the previous frame are present in a snapshot;
//! everything else is `None`, so a missing scroll value is never confused
//! with a scroll value of zero.

use crate::focus::SurfaceId;
use bitflags::bitflags;
use std::fmt;

/// Linux input code of the left mouse button.
pub const BTN_LEFT: u32 = 0x110;
/// Linux input code of the right mouse button.
pub const BTN_RIGHT: u32 = 0x111;
/// Linux input code of the middle mouse button.
pub const BTN_MIDDLE: u32 = 0x112;
/// Linux input code of the side (back) button.
pub const BTN_SIDE: u32 = 0x113;
/// Linux input code of the extra (forward) button.
pub const BTN_EXTRA: u32 = 0x114;

/// Convert a 24.8 fixed-point wire value to a float.
pub fn fixed_to_f64(raw: i32) -> f64 {
    f64::from(raw) / 256.0
}

bitflags! {
    /// Which kinds of fragment contributed to a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
    pub struct FrameMask: u32 {
        const ENTER = 1 << 0;
        const LEAVE = 1 << 1;
        const MOTION = 1 << 2;
        const BUTTON = 1 << 3;
        const AXIS = 1 << 4;
        const AXIS_SOURCE = 1 << 5;
        const AXIS_STOP = 1 << 6;
        const AXIS_DISCRETE = 1 << 7;
    }
}

/// Mouse buttons, identified by their Linux input codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    /// `BTN_LEFT`.
    Left,
    /// `BTN_RIGHT`.
    Right,
    /// `BTN_MIDDLE`.
    Middle,
    /// `BTN_SIDE`, usually "back".
    Side,
    /// `BTN_EXTRA`, usually "forward".
    Extra,
    /// Any other code.
    Other(u32),
}

impl Button {
    /// Create a button from its input code.
    pub fn from_code(code: u32) -> Self {
        match code {
            BTN_LEFT => Button::Left,
            BTN_RIGHT => Button::Right,
            BTN_MIDDLE => Button::Middle,
            BTN_SIDE => Button::Side,
            BTN_EXTRA => Button::Extra,
            other => Button::Other(other),
        }
    }

    /// The input code of this button.
    pub fn code(&self) -> u32 {
        match self {
            Button::Left => BTN_LEFT,
            Button::Right => BTN_RIGHT,
            Button::Middle => BTN_MIDDLE,
            Button::Side => BTN_SIDE,
            Button::Extra => BTN_EXTRA,
            Button::Other(code) => *code,
        }
    }
}

/// Button press state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum ButtonState {
    /// Button released.
    Released,
    /// Button pressed.
    Pressed,
}

impl ButtonState {
    /// Decode the wire value (0 released, anything else pressed).
    pub fn from_raw(raw: u32) -> Self {
        if raw == 0 {
            ButtonState::Released
        } else {
            ButtonState::Pressed
        }
    }
}

/// Scroll axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Vertical scroll (index 0).
    Vertical,
    /// Horizontal scroll (index 1).
    Horizontal,
}

impl Axis {
    /// Decode the wire index. Only 0 and 1 are valid.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Axis::Vertical),
            1 => Some(Axis::Horizontal),
            _ => None,
        }
    }

    /// The wire index.
    pub fn index(&self) -> usize {
        match self {
            Axis::Vertical => 0,
            Axis::Horizontal => 1,
        }
    }

    /// Lowercase name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Vertical => "vertical",
            Axis::Horizontal => "horizontal",
        }
    }
}

/// What produced a scroll sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisSource {
    /// A physical wheel.
    Wheel,
    /// A finger on a touch surface.
    Finger,
    /// Continuous movement without a terminating stop.
    Continuous,
    /// Side-to-side tilt of a wheel.
    WheelTilt,
    /// A source this crate does not know.
    Unknown(u32),
}

impl AxisSource {
    /// Decode the wire value.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => AxisSource::Wheel,
            1 => AxisSource::Finger,
            2 => AxisSource::Continuous,
            3 => AxisSource::WheelTilt,
            n => AxisSource::Unknown(n),
        }
    }

    /// Lowercase name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            AxisSource::Wheel => "wheel",
            AxisSource::Finger => "finger",
            AxisSource::Continuous => "continuous",
            AxisSource::WheelTilt => "wheel tilt",
            AxisSource::Unknown(_) => "unknown",
        }
    }
}

/// Surface-local pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// The last button change in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonEvent {
    /// Which button.
    pub button: Button,
    /// Pressed or released.
    pub state: ButtonState,
}

/// Scroll data gathered for one axis within a frame.
///
/// Value, discrete steps and stop are recorded independently; the consumer
/// decides how to combine them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisFrame {
    /// Continuous scroll distance, last value in the frame.
    pub value: Option<f64>,
    /// Discrete wheel steps.
    pub discrete: Option<i32>,
    /// Scrolling on this axis stopped.
    pub stopped: bool,
}

/// One raw pointer notification from the transport.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerFragment {
    /// Pointer entered a surface.
    Enter {
        serial: u32,
        surface: SurfaceId,
        x: f64,
        y: f64,
    },
    /// Pointer left a surface.
    Leave { serial: u32, surface: SurfaceId },
    /// Pointer moved within the focused surface.
    Motion { time: u32, x: f64, y: f64 },
    /// A button changed state.
    Button {
        serial: u32,
        time: u32,
        button: u32,
        state: u32,
    },
    /// Continuous scroll on an axis.
    Axis { time: u32, axis: u32, value: f64 },
    /// Source of the scroll in this frame.
    AxisSource { source: u32 },
    /// Scrolling stopped on an axis.
    AxisStop { time: u32, axis: u32 },
    /// Discrete wheel steps on an axis.
    AxisDiscrete { axis: u32, discrete: i32 },
}

/// Fragments collected since the last frame boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingPointerFrame {
    mask: FrameMask,
    serial: Option<u32>,
    time: Option<u32>,
    enter: Option<Position>,
    motion: Option<Position>,
    button: Option<ButtonEvent>,
    axes: [Option<AxisFrame>; 2],
    axis_source: Option<AxisSource>,
}

impl PendingPointerFrame {
    /// Which fragments have been received.
    pub fn mask(&self) -> FrameMask {
        self.mask
    }

    /// No fragment has been received.
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisFrame {
        self.axes[axis.index()].get_or_insert_with(AxisFrame::default)
    }
}

/// A completed, immutable pointer frame.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "recorder", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerSnapshot {
    /// Which kinds of fragment contributed.
    pub mask: FrameMask,
    /// Serial of the most recent serial-carrying fragment.
    pub serial: Option<u32>,
    /// Timestamp of the most recent timed fragment, in milliseconds.
    pub time: Option<u32>,
    /// Entry position, if the pointer entered a surface.
    pub enter: Option<Position>,
    /// The pointer left its surface.
    pub left: bool,
    /// Latest motion position.
    pub motion: Option<Position>,
    /// Latest button change.
    pub button: Option<ButtonEvent>,
    /// Vertical scroll data.
    pub vertical: Option<AxisFrame>,
    /// Horizontal scroll data.
    pub horizontal: Option<AxisFrame>,
    /// Scroll source.
    pub axis_source: Option<AxisSource>,
}

impl PointerSnapshot {
    /// No fragment contributed to this frame.
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Scroll data for `axis`.
    pub fn axis(&self, axis: Axis) -> Option<&AxisFrame> {
        match axis {
            Axis::Vertical => self.vertical.as_ref(),
            Axis::Horizontal => self.horizontal.as_ref(),
        }
    }

    /// The most recent known position: motion if any, else entry.
    pub fn position(&self) -> Option<Position> {
        self.motion.or(self.enter)
    }
}

impl From<PendingPointerFrame> for PointerSnapshot {
    fn from(pending: PendingPointerFrame) -> Self {
        let [vertical, horizontal] = pending.axes;
        Self {
            mask: pending.mask,
            serial: pending.serial,
            time: pending.time,
            enter: pending.enter,
            left: pending.mask.contains(FrameMask::LEAVE),
            motion: pending.motion,
            button: pending.button,
            vertical,
            horizontal,
            axis_source: pending.axis_source,
        }
    }
}

impl fmt::Display for PointerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "pointer frame @ {}:", time)?,
            None => write!(f, "pointer frame:")?,
        }

        if let Some(p) = self.enter {
            write!(f, " entered {:.2}, {:.2}", p.x, p.y)?;
        }
        if self.left {
            write!(f, " leave")?;
        }
        if let Some(p) = self.motion {
            write!(f, " motion {:.2}, {:.2}", p.x, p.y)?;
        }
        if let Some(b) = self.button {
            let state = match b.state {
                ButtonState::Pressed => "pressed",
                ButtonState::Released => "released",
            };
            write!(f, " button {} {}", b.button.code(), state)?;
        }

        for axis in [Axis::Vertical, Axis::Horizontal] {
            let Some(frame) = self.axis(axis) else {
                continue;
            };
            write!(f, " {} axis", axis.name())?;
            if let Some(value) = frame.value {
                write!(f, " value {:.2}", value)?;
            }
            if let Some(discrete) = frame.discrete {
                write!(f, " discrete {}", discrete)?;
            }
            if let Some(source) = self.axis_source {
                write!(f, " via {}", source.name())?;
            }
            if frame.stopped {
                write!(f, " (stopped)")?;
            }
        }

        Ok(())
    }
}

/// Coalesces pointer fragments into one snapshot per frame.
#[derive(Debug, Default)]
pub struct PointerFrameAggregator {
    pending: PendingPointerFrame,
}

impl PointerFrameAggregator {
    /// Create an aggregator with an empty pending frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame being accumulated.
    pub fn pending(&self) -> &PendingPointerFrame {
        &self.pending
    }

    /// Pointer entered a surface at `(x, y)`.
    pub fn enter(&mut self, serial: u32, x: f64, y: f64) {
        self.pending.mask |= FrameMask::ENTER;
        self.pending.serial = Some(serial);
        self.pending.enter = Some(Position { x, y });
    }

    /// Pointer left its surface.
    pub fn leave(&mut self, serial: u32) {
        self.pending.mask |= FrameMask::LEAVE;
        self.pending.serial = Some(serial);
    }

    /// Pointer moved to `(x, y)`.
    pub fn motion(&mut self, time: u32, x: f64, y: f64) {
        self.pending.mask |= FrameMask::MOTION;
        self.pending.time = Some(time);
        self.pending.motion = Some(Position { x, y });
    }

    /// A button changed state.
    pub fn button(&mut self, serial: u32, time: u32, button: u32, state: u32) {
        self.pending.mask |= FrameMask::BUTTON;
        self.pending.serial = Some(serial);
        self.pending.time = Some(time);
        self.pending.button = Some(ButtonEvent {
            button: Button::from_code(button),
            state: ButtonState::from_raw(state),
        });
    }

    /// Continuous scroll on `axis`. A later value in the same frame replaces
    /// an earlier one.
    pub fn axis(&mut self, time: u32, axis: u32, value: f64) {
        let Some(axis) = checked_axis("axis", axis) else {
            return;
        };
        self.pending.mask |= FrameMask::AXIS;
        self.pending.time = Some(time);
        self.pending.axis_mut(axis).value = Some(value);
    }

    /// Source of the scroll in this frame.
    pub fn axis_source(&mut self, source: u32) {
        let source = AxisSource::from_raw(source);
        if let AxisSource::Unknown(raw) = source {
            log::debug!("unknown pointer axis source {}", raw);
        }
        self.pending.mask |= FrameMask::AXIS_SOURCE;
        self.pending.axis_source = Some(source);
    }

    /// Scrolling stopped on `axis`.
    pub fn axis_stop(&mut self, time: u32, axis: u32) {
        let Some(axis) = checked_axis("axis_stop", axis) else {
            return;
        };
        self.pending.mask |= FrameMask::AXIS_STOP;
        self.pending.time = Some(time);
        self.pending.axis_mut(axis).stopped = true;
    }

    /// Discrete wheel steps on `axis`.
    pub fn axis_discrete(&mut self, axis: u32, discrete: i32) {
        let Some(axis) = checked_axis("axis_discrete", axis) else {
            return;
        };
        self.pending.mask |= FrameMask::AXIS_DISCRETE;
        self.pending.axis_mut(axis).discrete = Some(discrete);
    }

    /// Record one raw fragment.
    pub fn apply(&mut self, fragment: &PointerFragment) {
        match *fragment {
            PointerFragment::Enter { serial, x, y, .. } => self.enter(serial, x, y),
            PointerFragment::Leave { serial, .. } => self.leave(serial),
            PointerFragment::Motion { time, x, y } => self.motion(time, x, y),
            PointerFragment::Button {
                serial,
                time,
                button,
                state,
            } => self.button(serial, time, button, state),
            PointerFragment::Axis { time, axis, value } => self.axis(time, axis, value),
            PointerFragment::AxisSource { source } => self.axis_source(source),
            PointerFragment::AxisStop { time, axis } => self.axis_stop(time, axis),
            PointerFragment::AxisDiscrete { axis, discrete } => self.axis_discrete(axis, discrete),
        }
    }

    /// Close the current frame and start an empty one.
    pub fn frame(&mut self) -> PointerSnapshot {
        if self.pending.is_empty() {
            log::debug!("pointer frame without any fragment");
        }
        std::mem::take(&mut self.pending).into()
    }

    /// Drop everything accumulated since the last frame.
    pub fn reset(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("discarding partial pointer frame {:?}", self.pending.mask);
        }
        self.pending = PendingPointerFrame::default();
    }
}

fn checked_axis(event: &str, index: u32) -> Option<Axis> {
    let axis = Axis::from_index(index);
    if axis.is_none() {
        log::warn!("ignoring pointer {} with out-of-range axis {}", event, index);
    }
    axis
}
