//! Interactive editing state: tools, drags, crop, zoom and remembered settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{DateTime, Local};
use log::{debug, info, warn};
use tokio::runtime::Handle;

use super::error::EditError;
use super::status::{LogStatus, StatusSink};
use crate::capture::{self, CaptureError, SaveTarget, ShareManager};
use crate::config::{Config, MemoryPreferences, PreferenceStore, THICKNESS_RANGE};
use crate::draw::filters::{
    Arrow, Circle, DottedLine, Pen, Rectangle, ShieldBlock, StraightLine, Text,
};
use crate::draw::{
    Color, Compositor, Filter, FontDescriptor, PangoRasterizer, PixelBuffer, TextRasterizer,
};
use crate::geometry::{Point, Rect};
use crate::input::{EventStream, Operation};
use crate::view::{Minimap, ViewMapping, Viewport};

pub const THICKNESS_KEY: &str = "thickness";
pub const LOG2_ZOOM_KEY: &str = "log2_zoom";
pub const DRAWING_COLOR_KEY: &str = "drawing_color";
pub const BACKGROUND_COLOR_KEY: &str = "background_color";
pub const FONT_SIZE_KEY: &str = "font_size";
pub const DEFAULT_PATH_KEY: &str = "default_path";

const DRAWING_DONE: &str = "Drawing done, use Control+Z to undo.";

/// Pointer position in viewport or minimap display pixels.
pub type DisplayPos = (f64, f64);

/// Settled input forwarded from the consumer tasks to the editor thread.
#[derive(Debug, Clone, Copy, PartialEq)]
enum EditorEvent {
    Drag(DisplayPos),
    PenMoved,
    MinimapDrag(DisplayPos),
    CursorMoved(DisplayPos),
}

/// Current tool settings applied to new annotations.
#[derive(Debug, Clone)]
pub struct DrawingSettings {
    pub color: Color,
    pub background: Color,
    pub thickness: f64,
    pub font_size: f64,
    pub font: FontDescriptor,
}

impl DrawingSettings {
    pub fn from_config(config: &Config) -> Self {
        let drawing = &config.drawing;
        Self {
            color: drawing.default_color.to_color(),
            background: drawing.text_background.to_color(),
            thickness: drawing.default_thickness,
            font_size: drawing.default_font_size,
            font: FontDescriptor::new(
                drawing.font_family.clone(),
                drawing.font_weight.clone(),
                drawing.font_style.clone(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragKind {
    /// Moves the view.
    Pan,
    /// Moves the second corner of the topmost filter.
    Shape,
    /// Appends to the topmost pen stroke from the consumer task.
    Pen,
    /// Nothing happens until release (e.g. annotation limit reached).
    Inert,
}

#[derive(Debug)]
struct ActiveDrag {
    start: DisplayPos,
    start_point: Point,
    kind: DragKind,
    stream: Option<EventStream<DisplayPos>>,
}

/// One editing session over a captured screenshot.
///
/// Must be driven from a thread that is not a runtime worker: ending a drag waits for its
/// consumer task.
pub struct Editor {
    compositor: Compositor,
    viewport: Viewport,
    minimap: Minimap,
    operation: Operation,
    settings: DrawingSettings,
    zoom_sensitivity: f64,
    queue_capacity: usize,
    debug_overlay: bool,
    captured_at: DateTime<Local>,

    status: Box<dyn StatusSink>,
    preferences: Box<dyn PreferenceStore>,
    rasterizer: Box<dyn TextRasterizer>,
    runtime: Handle,

    events_tx: Sender<EditorEvent>,
    events_rx: Receiver<EditorEvent>,
    drag: Option<ActiveDrag>,
    minimap_drag: Option<EventStream<DisplayPos>>,
    cursor_stream: Option<EventStream<DisplayPos>>,
    cursor: Option<DisplayPos>,
    skip_tap: bool,
    text_anchor: Option<Point>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("operation", &self.operation)
            .field("crop", &self.compositor.crop())
            .field("filters", &self.compositor.stack().len())
            .field("view", &self.viewport.view_rect())
            .field("dragging", &self.drag.is_some())
            .finish()
    }
}

impl Editor {
    /// Starts editing `original`, with the viewport initially as large as the image.
    ///
    /// Status goes to the log, preferences to memory and text through pango until
    /// replaced with the `with_*` builders.
    pub fn new(original: PixelBuffer, config: &Config, runtime: Handle) -> Self {
        let (width, height) = original.size();
        let (events_tx, events_rx) = mpsc::channel();
        let debug_overlay = config.debug.overlay || log::log_enabled!(log::Level::Trace);
        let mut editor = Self {
            compositor: Compositor::new(original, config.performance.max_filters),
            viewport: Viewport::new(width, height, config.view.initial_log2_zoom),
            minimap: Minimap::new(config.view.minimap_width, config.view.minimap_height),
            operation: Operation::NoOp,
            settings: DrawingSettings::from_config(config),
            zoom_sensitivity: config.view.zoom_sensitivity,
            queue_capacity: config.performance.drag_queue_capacity,
            debug_overlay,
            captured_at: Local::now(),
            status: Box::new(LogStatus),
            preferences: Box::new(MemoryPreferences::new()),
            rasterizer: Box::new(PangoRasterizer),
            runtime,
            events_tx,
            events_rx,
            drag: None,
            minimap_drag: None,
            cursor_stream: None,
            cursor: None,
            skip_tap: false,
            text_anchor: None,
        };
        editor.viewport.center_small_image(width, height);
        editor.render_views();
        info!(
            "Editing {}x{} screenshot, debug overlay {}",
            width,
            height,
            if debug_overlay { "on" } else { "off" }
        );
        editor
    }

    pub fn with_status(mut self, status: Box<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    /// Uses `preferences` and applies the settings remembered in it.
    pub fn with_preferences(mut self, preferences: Box<dyn PreferenceStore>) -> Self {
        self.preferences = preferences;
        let prefs = &self.preferences;
        let thickness = prefs.get_float(THICKNESS_KEY, self.settings.thickness);
        if THICKNESS_RANGE.contains(&thickness) {
            self.settings.thickness = thickness;
        } else {
            warn!(
                "Ignoring remembered thickness {}, keeping {}",
                thickness, self.settings.thickness
            );
        }
        self.settings.font_size = prefs.get_float(FONT_SIZE_KEY, self.settings.font_size);
        self.settings.color = prefs.get_color(DRAWING_COLOR_KEY, self.settings.color);
        self.settings.background = prefs.get_color(BACKGROUND_COLOR_KEY, self.settings.background);
        let log2_zoom = prefs.get_float(LOG2_ZOOM_KEY, self.viewport.log2_zoom());
        self.viewport.set_log2_zoom(log2_zoom);
        debug!("Restored preferences: {:?}", self.settings);
        self.render_views();
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Box<dyn TextRasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_capture_time(mut self, time: DateTime<Local>) -> Self {
        self.captured_at = time;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn minimap(&self) -> &Minimap {
        &self.minimap
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn settings(&self) -> &DrawingSettings {
        &self.settings
    }

    pub fn preferences(&self) -> &dyn PreferenceStore {
        self.preferences.as_ref()
    }

    pub fn text_anchor(&self) -> Option<Point> {
        self.text_anchor
    }

    /// Last settled pointer position over the viewport.
    pub fn cursor(&self) -> Option<DisplayPos> {
        self.cursor
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Immutable composed image as of now, for saving or sharing.
    pub fn snapshot(&self) -> Arc<PixelBuffer> {
        self.compositor.snapshot()
    }

    /// `Screenshot <date> <time>` of the capture.
    pub fn default_name(&self) -> String {
        capture::default_name(self.captured_at)
    }

    // ------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------

    /// Switches tool, ending any drag in progress first.
    pub fn set_operation(&mut self, operation: Operation) {
        if self.drag.is_some() {
            let _ = self.drag_end();
        }
        debug!("operation {:?} -> {:?}", self.operation, operation);
        self.operation = operation;
        if let Some(hint) = operation.hint() {
            self.set_status(hint);
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.settings.color = color;
        self.preferences.set_color(DRAWING_COLOR_KEY, color);
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.settings.background = color;
        self.preferences.set_color(BACKGROUND_COLOR_KEY, color);
    }

    /// Parses and applies a stroke thickness typed by the user. Values outside
    /// [`THICKNESS_RANGE`] are rejected.
    pub fn set_thickness_text(&mut self, text: &str) -> Result<f64, EditError> {
        let thickness = self.parse_positive("thickness", text)?;
        if !THICKNESS_RANGE.contains(&thickness) {
            self.set_status(&format!(
                "Thickness must be between {} and {}, got {}",
                THICKNESS_RANGE.start(),
                THICKNESS_RANGE.end(),
                thickness
            ));
            return Err(EditError::InvalidNumber {
                field: "thickness",
                value: text.to_string(),
            });
        }
        self.settings.thickness = thickness;
        self.preferences.set_float(THICKNESS_KEY, thickness);
        debug!("thickness set to {}", thickness);
        Ok(thickness)
    }

    // ------------------------------------------------------------------
    // Viewport drags and taps
    // ------------------------------------------------------------------

    /// Handles one drag event at display position `pos`.
    ///
    /// The first event of a drag starts it; later events are queued for the consumer
    /// task and acted on in [`Editor::process_events`].
    pub fn drag(&mut self, pos: DisplayPos) -> Result<(), EditError> {
        if let Some(active) = &self.drag {
            if let Some(stream) = &active.stream {
                stream.push(pos);
            }
            self.push_cursor(pos);
            return Ok(());
        }
        self.start_drag(pos)
    }

    fn start_drag(&mut self, pos: DisplayPos) -> Result<(), EditError> {
        let mapping = self.viewport.mapping();
        let start_point = mapping.to_source(pos) + self.compositor.crop().min;
        debug!(
            "drag start for {:?} at {:?} (image {:?})",
            self.operation, pos, start_point
        );

        let mut result = Ok(());
        let kind = match self.operation {
            Operation::NoOp
            | Operation::CropTopLeft
            | Operation::CropBottomRight
            | Operation::DrawText => {
                self.viewport.begin_pan();
                DragKind::Pan
            }
            Operation::DrawPen => {
                let pen = Pen::new(self.settings.color, self.settings.thickness);
                pen.add_point(start_point);
                match self.push_filter(Filter::Pen(pen)) {
                    Ok(()) => DragKind::Pen,
                    Err(e) => {
                        result = Err(e);
                        DragKind::Inert
                    }
                }
            }
            operation => {
                let extent = operation.initial_extent();
                let to = start_point + Point::new(extent, extent);
                match self.new_shape(operation, start_point, to) {
                    Some(filter) => match self.push_filter(filter) {
                        Ok(()) => DragKind::Shape,
                        Err(e) => {
                            result = Err(e);
                            DragKind::Inert
                        }
                    },
                    None => DragKind::Inert,
                }
            }
        };
        if kind != DragKind::Pan && kind != DragKind::Inert {
            self.recompose(false);
        }

        let stream = self.spawn_drag_stream(kind, mapping);
        self.drag = Some(ActiveDrag {
            start: pos,
            start_point,
            kind,
            stream: Some(stream),
        });
        result
    }

    fn spawn_drag_stream(&self, kind: DragKind, mapping: ViewMapping) -> EventStream<DisplayPos> {
        let events = self.events_tx.clone();
        let mut previous: Option<DisplayPos> = None;
        match (kind, self.active_pen()) {
            (DragKind::Pen, Some(pen)) => {
                let stroke = pen.stroke();
                let offset = self.compositor.crop().min;
                EventStream::spawn(
                    "pen",
                    &self.runtime,
                    self.queue_capacity,
                    move |pos: DisplayPos| {
                        if previous == Some(pos) {
                            return;
                        }
                        previous = Some(pos);
                        stroke.add_point(mapping.to_source(pos) + offset);
                        let _ = events.send(EditorEvent::PenMoved);
                    },
                )
            }
            _ => EventStream::spawn(
                "viewport drag",
                &self.runtime,
                self.queue_capacity,
                move |pos: DisplayPos| {
                    if previous == Some(pos) {
                        return;
                    }
                    previous = Some(pos);
                    let _ = events.send(EditorEvent::Drag(pos));
                },
            ),
        }
    }

    fn active_pen(&self) -> Option<&Pen> {
        match self.compositor.stack().iter().last() {
            Some(Filter::Pen(pen)) => Some(pen),
            _ => None,
        }
    }

    /// Finishes the current drag: waits for the last queued event, then recomposes
    /// everything and returns to [`Operation::NoOp`] when something was drawn.
    pub fn drag_end(&mut self) -> Result<(), EditError> {
        let stream = match self.drag.as_mut() {
            Some(active) => active.stream.take(),
            None => return Err(EditError::NoActiveDrag),
        };
        if let Some(stream) = stream {
            let settled = stream.finish();
            debug!("drag stream settled {} times", settled);
        }
        self.process_events();

        let Some(active) = self.drag.take() else {
            return Err(EditError::NoActiveDrag);
        };
        self.viewport.end_pan();
        self.skip_tap = true;

        match active.kind {
            DragKind::Shape | DragKind::Pen => {
                self.recompose(true);
                self.set_status(DRAWING_DONE);
                self.set_operation(Operation::NoOp);
            }
            DragKind::Pan => {
                self.minimap_refresh();
            }
            DragKind::Inert => {}
        }
        Ok(())
    }

    /// Handles a click on the viewport. A click right after a drag release is ignored.
    pub fn tap(&mut self, pos: DisplayPos) -> Result<(), EditError> {
        if self.skip_tap {
            debug!("tap at {:?} ignored after drag", pos);
            self.skip_tap = false;
            return Ok(());
        }
        let source = self.viewport.mapping().to_source(pos);
        let absolute = source + self.compositor.crop().min;
        debug!("tap at {:?} -> {:?} for {:?}", pos, absolute, self.operation);

        let result = match self.operation {
            Operation::NoOp => Ok(()),
            Operation::CropTopLeft => self.crop_top_left(source),
            Operation::CropBottomRight => self.crop_bottom_right(source),
            Operation::DrawText => {
                self.text_anchor = Some(absolute);
                Ok(())
            }
            operation => {
                if operation.draws_on_drag() {
                    self.set_status("You must drag to draw something ...");
                }
                Ok(())
            }
        };
        self.set_operation(Operation::NoOp);
        result
    }

    /// Adds the text typed for the location picked with [`Operation::DrawText`].
    pub fn commit_text(&mut self, text: &str, font_size_text: &str) -> Result<(), EditError> {
        let font_size = match font_size_text.trim().parse::<f64>() {
            Ok(size) if size.is_finite() && size > 0.0 => size,
            _ => {
                warn!("Error parsing the font size given: {:?}", font_size_text);
                self.set_status(&format!(
                    "Error parsing the font size given: {:?}",
                    font_size_text
                ));
                return Err(EditError::InvalidNumber {
                    field: "font size",
                    value: font_size_text.to_string(),
                });
            }
        };
        let Some(anchor) = self.text_anchor else {
            self.set_status("Click on the image to choose where the text goes.");
            return Err(EditError::MissingTextAnchor);
        };

        self.settings.font_size = font_size;
        self.preferences.set_float(FONT_SIZE_KEY, font_size);

        let mask = match self
            .rasterizer
            .rasterize(text, &self.settings.font, font_size)
        {
            Ok(mask) => mask,
            Err(e) => {
                self.set_status(&format!("Failed to render text: {e}"));
                return Err(e.into());
            }
        };
        let filter = Filter::Text(Text::new(
            anchor,
            text,
            mask,
            font_size,
            self.settings.color,
            self.settings.background,
        ));
        self.push_filter(filter)?;
        self.text_anchor = None;
        self.recompose(true);
        self.set_status("Text drawn, use Control+Z to undo.");
        Ok(())
    }

    /// Adds a ready-made annotation on top of the stack.
    pub fn add_filter(&mut self, filter: Filter) -> Result<(), EditError> {
        self.push_filter(filter)?;
        self.recompose(true);
        Ok(())
    }

    /// Removes the newest annotation. Returns false when there was none.
    pub fn undo(&mut self) -> bool {
        if self.drag.is_some() {
            let _ = self.drag_end();
        }
        match self.compositor.undo() {
            Some(removed) => {
                debug!("undid {}", removed.kind_name());
                self.render_views();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Crop
    // ------------------------------------------------------------------

    fn crop_top_left(&mut self, source: Point) -> Result<(), EditError> {
        let crop = self.compositor.crop();
        let requested = Rect::new(crop.min + source, crop.max);
        self.apply_crop(requested)?;
        self.viewport.set_pan(Point::ORIGIN);
        self.post_crop();
        Ok(())
    }

    fn crop_bottom_right(&mut self, source: Point) -> Result<(), EditError> {
        let crop = self.compositor.crop();
        let requested = Rect::new(crop.min, crop.min + source);
        self.apply_crop(requested)?;
        let view = self.viewport.view_rect();
        self.viewport
            .set_pan(Point::new(source.x - view.width(), source.y - view.height()));
        self.post_crop();
        Ok(())
    }

    /// Sets the crop to `crop` in full-image coordinates, clamped to the screenshot.
    pub fn set_crop(&mut self, crop: Rect) -> Result<Rect, EditError> {
        let applied = self.apply_crop(crop)?;
        self.viewport.set_pan(Point::ORIGIN);
        self.post_crop();
        Ok(applied)
    }

    fn apply_crop(&mut self, requested: Rect) -> Result<Rect, EditError> {
        match self.compositor.set_crop(requested) {
            Some(applied) => Ok(applied),
            None => {
                self.set_status(&format!(
                    "Crop {{{}, {}}} - {{{}, {}}} is empty, keeping the current crop.",
                    requested.min.x, requested.min.y, requested.max.x, requested.max.y
                ));
                Err(EditError::EmptyCrop(requested))
            }
        }
    }

    /// Goes back to the full screenshot, keeping the same image area in view.
    pub fn crop_reset(&mut self) {
        let previous = self.compositor.reset_crop();
        self.viewport.set_pan(self.viewport.pan() + previous.min);
        self.post_crop();
        let crop = self.compositor.crop();
        self.set_status(&format!(
            "Reset to original screenshot of size {} x {} pixels.",
            crop.width(),
            crop.height()
        ));
    }

    fn post_crop(&mut self) {
        let crop = self.compositor.crop();
        self.viewport.center_small_image(crop.width(), crop.height());
        self.render_views();
        self.set_status(&format!(
            "New crop: {{{}, {}}} - {{{}, {}}} of original screen, {} x {} pixels.",
            crop.min.x,
            crop.min.y,
            crop.max.x,
            crop.max.y,
            crop.width(),
            crop.height()
        ));
    }

    // ------------------------------------------------------------------
    // Zoom and display
    // ------------------------------------------------------------------

    /// Zooms around `pos` by `delta_y` scroll units.
    pub fn scroll(&mut self, pos: DisplayPos, delta_y: f64) {
        self.viewport.scroll(pos, delta_y, self.zoom_sensitivity);
        self.preferences
            .set_float(LOG2_ZOOM_KEY, self.viewport.log2_zoom());
        self.render_views();
    }

    /// Parses and applies a log2 zoom level typed by the user.
    pub fn set_zoom_text(&mut self, text: &str) -> Result<f64, EditError> {
        let log2_zoom = match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                self.set_status(&format!("Can't parse zoom level from {:?}", text));
                return Err(EditError::InvalidNumber {
                    field: "zoom level",
                    value: text.to_string(),
                });
            }
        };
        self.set_log2_zoom(log2_zoom);
        Ok(self.viewport.log2_zoom())
    }

    pub fn set_log2_zoom(&mut self, log2_zoom: f64) {
        self.viewport.set_log2_zoom(log2_zoom);
        self.preferences
            .set_float(LOG2_ZOOM_KEY, self.viewport.log2_zoom());
        self.render_views();
    }

    pub fn resize_view(&mut self, width: i32, height: i32) {
        self.viewport.resize(width, height);
        self.render_views();
    }

    pub fn resize_minimap(&mut self, width: i32, height: i32) {
        self.minimap.resize(width, height);
        self.minimap_refresh();
    }

    // ------------------------------------------------------------------
    // Minimap
    // ------------------------------------------------------------------

    /// Centers the view on the image pixel under a minimap click.
    pub fn minimap_tap(&mut self, pos: DisplayPos) {
        self.move_view_to(pos);
    }

    /// Queues a minimap drag position; the view follows once events settle.
    pub fn minimap_drag(&mut self, pos: DisplayPos) {
        if self.minimap_drag.is_none() {
            let events = self.events_tx.clone();
            let mut previous: Option<DisplayPos> = None;
            self.minimap_drag = Some(EventStream::spawn(
                "minimap drag",
                &self.runtime,
                self.queue_capacity,
                move |pos: DisplayPos| {
                    if previous == Some(pos) {
                        return;
                    }
                    previous = Some(pos);
                    let _ = events.send(EditorEvent::MinimapDrag(pos));
                },
            ));
        }
        if let Some(stream) = &self.minimap_drag {
            stream.push(pos);
        }
    }

    pub fn minimap_drag_end(&mut self) {
        if let Some(stream) = self.minimap_drag.take() {
            stream.finish();
        }
        self.process_events();
    }

    fn move_view_to(&mut self, pos: DisplayPos) {
        let view = self.viewport.view_rect();
        let pan = self.minimap.pan_target(pos, (view.width(), view.height()));
        debug!("minimap {:?} -> pan {:?}", pos, pan);
        self.viewport.set_pan(pan);
        self.render_views();
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// Records a hover position; only the newest of a burst is kept.
    pub fn mouse_moved(&mut self, pos: DisplayPos) {
        self.push_cursor(pos);
    }

    fn push_cursor(&mut self, pos: DisplayPos) {
        if self.cursor_stream.is_none() {
            let events = self.events_tx.clone();
            self.cursor_stream = Some(EventStream::spawn(
                "cursor",
                &self.runtime,
                self.queue_capacity,
                move |pos: DisplayPos| {
                    let _ = events.send(EditorEvent::CursorMoved(pos));
                },
            ));
        }
        if let Some(stream) = &self.cursor_stream {
            stream.push(pos);
        }
    }

    // ------------------------------------------------------------------
    // Event processing
    // ------------------------------------------------------------------

    /// Applies the settled events forwarded by the consumer tasks. Returns how many
    /// were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            handled += 1;
            match event {
                EditorEvent::Drag(pos) => self.drag_to(pos),
                EditorEvent::PenMoved => {
                    if matches!(self.drag.as_ref().map(|d| d.kind), Some(DragKind::Pen)) {
                        self.recompose(false);
                    }
                }
                EditorEvent::MinimapDrag(pos) => self.move_view_to(pos),
                EditorEvent::CursorMoved(pos) => self.cursor = Some(pos),
            }
        }
        handled
    }

    fn drag_to(&mut self, pos: DisplayPos) {
        let Some(active) = self.drag.as_ref() else {
            debug!("drag event at {:?} without an active drag", pos);
            return;
        };
        let (start, start_point, kind) = (active.start, active.start_point, active.kind);
        match kind {
            DragKind::Pan => {
                self.viewport.pan_to((pos.0 - start.0, pos.1 - start.1));
                self.render_views();
            }
            DragKind::Shape => {
                let to = self.viewport.mapping().to_source(pos) + self.compositor.crop().min;
                if let Some(filter) = self.compositor.stack_mut().last_mut() {
                    filter.set_points(start_point, to);
                }
                self.recompose(false);
            }
            DragKind::Pen | DragKind::Inert => {}
        }
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Writes the composed image as PNG into `target` and remembers the directory.
    pub fn save(&mut self, target: &SaveTarget) -> Result<PathBuf, CaptureError> {
        match capture::save_image(&self.snapshot(), target) {
            Ok(path) => {
                if let Some(parent) = path.parent() {
                    self.preferences
                        .set_string(DEFAULT_PATH_KEY, &parent.to_string_lossy());
                }
                self.set_status(&format!("Saved image to {:?}", path.display().to_string()));
                Ok(path)
            }
            Err(e) => {
                self.set_status(&format!("Failed to save image: {e}"));
                Err(e)
            }
        }
    }

    /// Hands a snapshot to `manager`; editing continues while it is delivered.
    pub fn share(&mut self, manager: &ShareManager) -> Result<(), CaptureError> {
        let name = self.default_name();
        match manager.request_share(self.snapshot(), &name) {
            Ok(()) => {
                self.set_status(&format!("Sharing {name} ..."));
                Ok(())
            }
            Err(e) => {
                self.set_status(&format!("Sharing failed: {e}"));
                Err(e)
            }
        }
    }

    /// Writes remembered settings to the preference store.
    pub fn save_preferences(&mut self) -> anyhow::Result<()> {
        self.preferences.flush()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn new_shape(&self, operation: Operation, from: Point, to: Point) -> Option<Filter> {
        let color = self.settings.color;
        let thickness = self.settings.thickness;
        let filter = match operation {
            Operation::DrawArrow => Filter::Arrow(Arrow::new(from, to, color, thickness)),
            Operation::DrawLine => {
                Filter::StraightLine(StraightLine::new(from, to, color, thickness))
            }
            Operation::DrawDottedLine => {
                Filter::DottedLine(DottedLine::new(from, to, color, thickness))
            }
            Operation::DrawRectangle => {
                Filter::Rectangle(Rectangle::new(from, to, color, thickness))
            }
            Operation::DrawShieldBlock => Filter::ShieldBlock(ShieldBlock::new(from, to, color)),
            Operation::DrawCircle => Filter::Circle(Circle::new(from, to, color, thickness)),
            _ => return None,
        };
        Some(filter)
    }

    fn push_filter(&mut self, mut filter: Filter) -> Result<(), EditError> {
        filter.set_debug_overlay(self.debug_overlay);
        let kind = filter.kind_name();
        match self.compositor.stack_mut().try_push(filter) {
            Ok(()) => {
                debug!("added {}", kind);
                Ok(())
            }
            Err(_) => {
                let max = self.compositor.stack().max();
                warn!("annotation limit {} reached, {} dropped", max, kind);
                self.set_status(&format!(
                    "Too many annotations ({max}), undo some before drawing more."
                ));
                Err(EditError::FilterLimit(max))
            }
        }
    }

    /// Recomposes (fully, or just the visible area) and refreshes both views.
    fn recompose(&mut self, full: bool) {
        let visible = self.viewport.view_rect();
        self.compositor.apply_filters(full, visible);
        self.render_views();
    }

    fn render_views(&mut self) {
        self.viewport.render(self.compositor.composed());
        self.minimap_refresh();
    }

    fn minimap_refresh(&mut self) {
        self.minimap
            .render(self.compositor.composed(), self.viewport.view_rect());
    }

    fn set_status(&mut self, message: &str) {
        self.status.set_status(message);
    }

    fn parse_positive(&mut self, field: &'static str, text: &str) -> Result<f64, EditError> {
        match text.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
            _ => {
                self.set_status(&format!("Can't parse {field} from {:?}", text));
                Err(EditError::InvalidNumber {
                    field,
                    value: text.to_string(),
                })
            }
        }
    }
}
