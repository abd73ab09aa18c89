// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scripted display: window tree, resources and the notification queue.
//!
//! Everything here plays the part of *other* clients and the server itself.
//! Scripting calls change the window tree and queue the notifications a
//! compositing manager would receive, each tagged with the compositor's
//! request sequence at the time it was generated.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use lucent_core::atoms::Atoms;
use lucent_core::compositor::{Capabilities, Screen};
use lucent_core::error::{ErrorCode, ProtocolError};
use lucent_core::event::{ConfigureNotify, Event, Place, ShapeKind, ShapeNotify};
use lucent_core::geometry::{Geometry, MapState, ScreenRect, WindowClass};
use lucent_core::id::{
    Atom, DamageId, FormatId, PictureId, PixmapId, RegionId, Sequence, VisualId, WindowId,
};
use lucent_core::service::{Color, Drawable, PictFormat, Property, WindowAttributes};
use tracing::trace;

use crate::region::Region;
use crate::surface::{Rgba, Surface, TRANSPARENT, premultiplied};

/// Visual of ordinary 24-bit windows.
pub const RGB_VISUAL: VisualId = VisualId(0x21);
/// Visual of 32-bit windows with an alpha channel.
pub const ARGB_VISUAL: VisualId = VisualId(0x22);

pub(crate) const RGB24: PictFormat = PictFormat {
    id: FormatId(0x30),
    depth: 24,
    has_alpha: false,
};
pub(crate) const ARGB32: PictFormat = PictFormat {
    id: FormatId(0x31),
    depth: 32,
    has_alpha: true,
};
pub(crate) const A8: PictFormat = PictFormat {
    id: FormatId(0x32),
    depth: 8,
    has_alpha: true,
};

/// Major opcode the harness reports for the Composite extension.
pub const COMPOSITE_OPCODE: u8 = 142;
/// Minor opcode of Composite `RedirectSubwindows`.
const REDIRECT_SUBWINDOWS: u16 = 2;

/// Predefined atoms, numbered as on a real server.
const PREDEFINED_ATOMS: [(&str, u32); 3] = [("ATOM", 4), ("CARDINAL", 6), ("PIXMAP", 20)];

/// Description of a window to create.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowSpec {
    /// Outer position, inner size and border.
    pub geometry: Geometry,
    /// Initial content, not premultiplied.
    pub color: Color,
    /// Whether the window uses the 32-bit ARGB visual.
    pub argb: bool,
    /// Whether the window is input-only.
    pub input_only: bool,
    /// Whether the window bypasses the window manager.
    pub override_redirect: bool,
}

impl WindowSpec {
    /// An opaque black window at `(x, y)` of `width` × `height`.
    #[must_use]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            geometry: Geometry {
                x,
                y,
                width,
                height,
                border_width: 0,
            },
            color: Color::BLACK,
            argb: false,
            input_only: false,
            override_redirect: false,
        }
    }

    /// Sets the initial content color.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Uses the ARGB visual.
    #[must_use]
    pub fn argb(mut self) -> Self {
        self.argb = true;
        self
    }

    /// Makes the window input-only.
    #[must_use]
    pub fn input_only(mut self) -> Self {
        self.input_only = true;
        self
    }

    /// Sets the border width.
    #[must_use]
    pub fn border(mut self, width: u32) -> Self {
        self.geometry.border_width = width;
        self
    }
}

pub(crate) struct WindowState {
    pub(crate) parent: Option<WindowId>,
    /// Bottom to top.
    pub(crate) children: Vec<WindowId>,
    pub(crate) attrs: WindowAttributes,
    pub(crate) fill: Rgba,
    /// Border-inclusive backing storage. Replaced on resize.
    pub(crate) content: Rc<RefCell<Surface>>,
    /// Bounding shape relative to the inner origin; `None` is rectangular.
    pub(crate) shape: Option<Vec<ScreenRect>>,
    pub(crate) properties: BTreeMap<Atom, Property>,
    pub(crate) property_events: bool,
    pub(crate) shape_events: bool,
}

impl WindowState {
    fn new(parent: Option<WindowId>, attrs: WindowAttributes, fill: Rgba) -> Self {
        let extents = attrs.geometry.extents();
        Self {
            parent,
            children: Vec::new(),
            attrs,
            fill,
            content: Rc::new(RefCell::new(Surface::filled(
                extents.width,
                extents.height,
                fill,
            ))),
            shape: None,
            properties: BTreeMap::new(),
            property_events: false,
            shape_events: false,
        }
    }

    pub(crate) fn border_offset(&self) -> i32 {
        i32::try_from(self.attrs.geometry.border_width).unwrap_or(i32::MAX)
    }

    /// The bounding shape relative to the inner origin.
    pub(crate) fn bounding(&self) -> Region {
        match &self.shape {
            Some(rects) => Region::from_rects(rects),
            None => {
                let g = self.attrs.geometry;
                let bw = self.border_offset();
                let outer = g.extents();
                Region::from_rects(&[ScreenRect::new(-bw, -bw, outer.width, outer.height)])
            }
        }
    }
}

/// Backing storage a picture reads and writes.
#[derive(Clone, Debug)]
pub(crate) enum Target {
    /// A window's current content, looked up on every use.
    Window(WindowId),
    /// A pixmap surface, kept alive by the picture.
    Surface(Rc<RefCell<Surface>>),
}

#[derive(Clone, Debug)]
pub(crate) struct Picture {
    pub(crate) drawable: Drawable,
    pub(crate) target: Target,
    pub(crate) format: PictFormat,
    pub(crate) repeat: bool,
    pub(crate) clip: Option<Region>,
}

#[derive(Clone, Debug)]
pub(crate) struct DamageObject {
    pub(crate) window: WindowId,
    /// Window-relative.
    pub(crate) pending: Region,
    pub(crate) reported: bool,
}

/// One composite request as executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeRecord {
    /// Drawable the source picture was created on.
    pub source: Drawable,
    /// Destination picture.
    pub dst: PictureId,
    /// Requested destination area.
    pub area: ScreenRect,
    /// Destination pixels actually written after clipping.
    pub touched: usize,
}

/// A headless display server with a software rasterizer.
///
/// Implements [`RenderService`](lucent_core::service::RenderService) for the
/// compositor and a scripting surface for tests to play other clients.
pub struct HeadlessService {
    pub(crate) sequence: u64,
    next_id: u32,
    next_atom: u32,
    pub(crate) root: WindowId,
    pub(crate) windows: BTreeMap<WindowId, WindowState>,
    pub(crate) regions: BTreeMap<RegionId, Region>,
    pub(crate) pictures: BTreeMap<PictureId, Picture>,
    pub(crate) pixmaps: BTreeMap<PixmapId, Rc<RefCell<Surface>>>,
    pub(crate) damages: BTreeMap<DamageId, DamageObject>,
    atoms: BTreeMap<String, Atom>,
    events: VecDeque<(Event, Sequence)>,
    pub(crate) composites: Vec<CompositeRecord>,
    pub(crate) named_pixmaps: bool,
}

impl core::fmt::Debug for HeadlessService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HeadlessService")
            .field("sequence", &self.sequence)
            .field("windows", &self.windows.len())
            .field("regions", &self.regions.len())
            .field("pictures", &self.pictures.len())
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl HeadlessService {
    /// Creates a display with a `width` × `height` root window.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let root = WindowId(0x100);
        let attrs = WindowAttributes {
            geometry: Geometry {
                x: 0,
                y: 0,
                width,
                height,
                border_width: 0,
            },
            map_state: MapState::Viewable,
            class: WindowClass::InputOutput,
            visual: RGB_VISUAL,
            override_redirect: false,
        };
        let mut root_state = WindowState::new(None, attrs, [0.0, 0.0, 0.0, 1.0]);
        root_state.property_events = true;
        let mut windows = BTreeMap::new();
        windows.insert(root, root_state);
        Self {
            sequence: 0,
            next_id: 0x200,
            next_atom: 100,
            root,
            windows,
            regions: BTreeMap::new(),
            pictures: BTreeMap::new(),
            pixmaps: BTreeMap::new(),
            damages: BTreeMap::new(),
            atoms: PREDEFINED_ATOMS
                .iter()
                .map(|&(name, id)| (name.to_owned(), Atom(id)))
                .collect(),
            events: VecDeque::new(),
            composites: Vec::new(),
            named_pixmaps: true,
        }
    }

    /// Disables naming of window pixmaps, so windows are read directly.
    #[must_use]
    pub fn without_named_pixmaps(mut self) -> Self {
        self.named_pixmaps = false;
        self
    }

    /// The root window.
    #[must_use]
    pub fn root(&self) -> WindowId {
        self.root
    }

    /// The screen description handed to the compositor.
    #[must_use]
    pub fn screen(&self) -> Screen {
        let g = self.windows[&self.root].attrs.geometry;
        Screen {
            root: self.root,
            width: g.width,
            height: g.height,
            depth: RGB24.depth,
            format: RGB24,
        }
    }

    /// What the harness supports.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            composite_opcode: COMPOSITE_OPCODE,
            name_window_pixmap: self.named_pixmaps,
        }
    }

    /// Interns `name`, allocating a new atom on first use.
    pub fn intern(&mut self, name: &str) -> Atom {
        if let Some(&atom) = self.atoms.get(name) {
            return atom;
        }
        self.next_atom += 1;
        let atom = Atom(self.next_atom);
        self.atoms.insert(name.to_owned(), atom);
        atom
    }

    /// Interns the atoms the compositor uses.
    pub fn atoms(&mut self) -> Atoms {
        match Atoms::intern_with(|name| Ok::<_, core::convert::Infallible>(self.intern(name))) {
            Ok(atoms) => atoms,
            Err(never) => match never {},
        }
    }

    /// Top-level windows, bottom to top.
    #[must_use]
    pub fn top_level(&self) -> Vec<WindowId> {
        self.windows[&self.root].children.clone()
    }

    pub(crate) fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn current(&self) -> Sequence {
        Sequence(self.sequence)
    }

    pub(crate) fn notify(&mut self, event: Event) {
        trace!(?event, sequence = self.sequence, "queued notification");
        self.events.push_back((event, self.current()));
    }

    /// Queues a failure of the request just issued.
    pub(crate) fn fail(&mut self, code: ErrorCode, major_opcode: u8, minor_opcode: u16) {
        let error = ProtocolError {
            sequence: self.current(),
            code,
            major_opcode,
            minor_opcode,
        };
        trace!(%error, "request failed");
        self.events.push_back((Event::Error(error), self.current()));
    }

    /// Drains every queued notification with its generation sequence.
    pub fn take_events(&mut self) -> Vec<(Event, Sequence)> {
        self.events.drain(..).collect()
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn is_top_level(&self, window: WindowId) -> bool {
        self.windows
            .get(&window)
            .is_some_and(|w| w.parent == Some(self.root))
    }

    // -- Scripting: window lifecycle --

    /// Creates an unmapped top-level window on top of the stack.
    pub fn create_window(&mut self, spec: WindowSpec) -> WindowId {
        self.create_child(self.root, spec)
    }

    /// Creates an unmapped child of `parent` on top of its siblings.
    pub fn create_child(&mut self, parent: WindowId, spec: WindowSpec) -> WindowId {
        let id = WindowId(self.alloc_id());
        let attrs = WindowAttributes {
            geometry: spec.geometry,
            map_state: MapState::Unmapped,
            class: if spec.input_only {
                WindowClass::InputOnly
            } else {
                WindowClass::InputOutput
            },
            visual: if spec.argb { ARGB_VISUAL } else { RGB_VISUAL },
            override_redirect: spec.override_redirect,
        };
        self.windows
            .insert(id, WindowState::new(Some(parent), attrs, premultiplied(spec.color)));
        if let Some(p) = self.windows.get_mut(&parent) {
            p.children.push(id);
        }
        if parent == self.root {
            self.notify(Event::Create { window: id });
        }
        id
    }

    /// Maps a window and damages its whole content.
    pub fn map_window(&mut self, window: WindowId) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        w.attrs.map_state = MapState::Viewable;
        if self.is_top_level(window) {
            self.notify(Event::Map { window });
        }
        self.damage_all(window);
    }

    /// Unmaps a window.
    pub fn unmap_window(&mut self, window: WindowId) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        if w.attrs.map_state == MapState::Unmapped {
            return;
        }
        w.attrs.map_state = MapState::Unmapped;
        if self.is_top_level(window) {
            self.notify(Event::Unmap { window });
        }
    }

    /// Destroys a window and its descendants, unmapping it first.
    ///
    /// Pictures on destroyed windows and their damage objects die with them.
    pub fn destroy_window(&mut self, window: WindowId) {
        if !self.windows.contains_key(&window) || window == self.root {
            return;
        }
        self.unmap_window(window);
        let top_level = self.is_top_level(window);
        let mut doomed = vec![window];
        let mut i = 0;
        while let Some(&id) = doomed.get(i) {
            if let Some(w) = self.windows.get(&id) {
                doomed.extend(w.children.iter().copied());
            }
            i += 1;
        }
        if let Some(parent) = self.windows.get(&window).and_then(|w| w.parent)
            && let Some(p) = self.windows.get_mut(&parent)
        {
            p.children.retain(|&c| c != window);
        }
        for id in &doomed {
            self.windows.remove(id);
        }
        self.pictures
            .retain(|_, p| !matches!(p.target, Target::Window(w) if doomed.contains(&w)));
        self.damages.retain(|_, d| !doomed.contains(&d.window));
        if top_level {
            self.notify(Event::Destroy { window });
        }
    }

    /// Moves or resizes a window. A resize replaces its content with the
    /// initial fill and damages all of it.
    pub fn configure_window(&mut self, window: WindowId, geometry: Geometry) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        let old = w.attrs.geometry;
        w.attrs.geometry = geometry;
        let resized = old.extents().width != geometry.extents().width
            || old.extents().height != geometry.extents().height;
        if resized {
            let e = geometry.extents();
            w.content = Rc::new(RefCell::new(Surface::filled(e.width, e.height, w.fill)));
        }
        self.notify_configure(window);
        if resized {
            self.damage_all(window);
        }
    }

    /// Resizes the root window.
    pub fn resize_root(&mut self, width: u32, height: u32) {
        let root = self.root;
        if let Some(w) = self.windows.get_mut(&root) {
            w.attrs.geometry.width = width;
            w.attrs.geometry.height = height;
            w.content = Rc::new(RefCell::new(Surface::filled(width, height, w.fill)));
        }
        self.notify(Event::Configure(ConfigureNotify {
            window: root,
            geometry: self.windows[&root].attrs.geometry,
            above: None,
            override_redirect: false,
        }));
    }

    fn notify_configure(&mut self, window: WindowId) {
        if !self.is_top_level(window) {
            return;
        }
        let w = &self.windows[&window];
        let siblings = &self.windows[&self.root].children;
        let above = siblings
            .iter()
            .position(|&s| s == window)
            .and_then(|i| i.checked_sub(1))
            .map(|i| siblings[i]);
        let notify = ConfigureNotify {
            window,
            geometry: w.attrs.geometry,
            above,
            override_redirect: w.attrs.override_redirect,
        };
        self.notify(Event::Configure(notify));
    }

    fn move_in_stack(&mut self, window: WindowId, to_top: bool) -> bool {
        let Some(parent) = self.windows.get(&window).and_then(|w| w.parent) else {
            return false;
        };
        let Some(p) = self.windows.get_mut(&parent) else {
            return false;
        };
        p.children.retain(|&c| c != window);
        if to_top {
            p.children.push(window);
        } else {
            p.children.insert(0, window);
        }
        true
    }

    /// Raises a window to the top of its siblings.
    pub fn raise_window(&mut self, window: WindowId) {
        if self.move_in_stack(window, true) {
            self.notify_configure(window);
        }
    }

    /// Lowers a window to the bottom of its siblings.
    pub fn lower_window(&mut self, window: WindowId) {
        if self.move_in_stack(window, false) {
            self.notify_configure(window);
        }
    }

    /// Circulates a window to one end of the stack.
    pub fn circulate_window(&mut self, window: WindowId, place: Place) {
        if self.move_in_stack(window, place == Place::OnTop) && self.is_top_level(window) {
            self.notify(Event::Circulate { window, place });
        }
    }

    /// Moves a window under a new parent, on top of its new siblings.
    pub fn reparent_window(&mut self, window: WindowId, parent: WindowId) {
        let Some(old) = self.windows.get(&window).and_then(|w| w.parent) else {
            return;
        };
        if let Some(p) = self.windows.get_mut(&old) {
            p.children.retain(|&c| c != window);
        }
        if let Some(p) = self.windows.get_mut(&parent) {
            p.children.push(window);
        }
        if let Some(w) = self.windows.get_mut(&window) {
            w.parent = Some(parent);
        }
        if old == self.root || parent == self.root {
            self.notify(Event::Reparent { window, parent });
        }
    }

    // -- Scripting: content --

    /// Fills `rect`, relative to the window's inner origin, and reports the
    /// damage.
    pub fn draw(&mut self, window: WindowId, rect: ScreenRect, color: Color) {
        let Some(w) = self.windows.get(&window) else {
            return;
        };
        let bw = w.border_offset();
        w.content
            .borrow_mut()
            .fill(rect.translated(bw, bw), premultiplied(color));
        self.report_damage(window, &Region::from_rects(&[rect]));
    }

    fn damage_all(&mut self, window: WindowId) {
        let Some(w) = self.windows.get(&window) else {
            return;
        };
        let g = w.attrs.geometry;
        let whole = Region::from_rects(&[ScreenRect::new(0, 0, g.width, g.height)]);
        self.report_damage(window, &whole);
    }

    pub(crate) fn report_damage(&mut self, window: WindowId, area: &Region) {
        let viewable = self
            .windows
            .get(&window)
            .is_some_and(|w| w.attrs.map_state == MapState::Viewable);
        if !viewable {
            return;
        }
        let mut newly = false;
        for d in self.damages.values_mut().filter(|d| d.window == window) {
            d.pending = d.pending.union(area);
            if !d.reported {
                d.reported = true;
                newly = true;
            }
        }
        if newly {
            self.notify(Event::Damage { window });
        }
    }

    /// Replaces the bounding shape. `None` restores the rectangular default.
    pub fn set_shape(&mut self, window: WindowId, shape: Option<&[ScreenRect]>) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        w.shape = shape.map(<[ScreenRect]>::to_vec);
        let bounds = w.bounding().bounds();
        let selected = w.shape_events;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "region bounds are built from integer rectangles"
        )]
        let bounds = ScreenRect::new(
            bounds.x0 as i32,
            bounds.y0 as i32,
            bounds.width() as u32,
            bounds.height() as u32,
        );
        if selected {
            self.notify(Event::Shape(ShapeNotify {
                window,
                kind: ShapeKind::Bounding,
                shaped: shape.is_some(),
                bounds,
            }));
        }
    }

    // -- Scripting: properties --

    /// Sets a property and notifies listeners.
    pub fn set_property(&mut self, window: WindowId, atom: Atom, value: Property) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        w.properties.insert(atom, value);
        if w.property_events {
            self.notify(Event::Property { window, atom });
        }
    }

    /// Deletes a property and notifies listeners.
    pub fn delete_property(&mut self, window: WindowId, atom: Atom) {
        let Some(w) = self.windows.get_mut(&window) else {
            return;
        };
        if w.properties.remove(&atom).is_some() && w.property_events {
            self.notify(Event::Property { window, atom });
        }
    }

    /// Sets `_NET_WM_WINDOW_OPACITY` from a fraction, or deletes it.
    pub fn set_opacity(&mut self, window: WindowId, fraction: Option<f64>) {
        let atom = self.intern(lucent_core::atoms::OPACITY_PROPERTY);
        match fraction {
            Some(f) => {
                let cardinal = self.intern("CARDINAL");
                let value = lucent_core::mode::Opacity::from_fraction(f).0;
                self.set_property(
                    window,
                    atom,
                    Property::Present {
                        kind: cardinal,
                        format: 32,
                        values: vec![value],
                    },
                );
            }
            None => self.delete_property(window, atom),
        }
    }

    /// Sets `_NET_WM_WINDOW_TYPE` to the atom named `type_name`.
    pub fn set_window_type(&mut self, window: WindowId, type_name: &str) {
        let atom = self.intern("_NET_WM_WINDOW_TYPE");
        let kind = self.intern("ATOM");
        let value = self.intern(type_name).0;
        self.set_property(
            window,
            atom,
            Property::Present {
                kind,
                format: 32,
                values: vec![value],
            },
        );
    }

    /// Publishes a `width` × `height` background pixmap of `color` through
    /// `_XROOTPMAP_ID` and returns it.
    pub fn set_background(&mut self, width: u32, height: u32, color: Color) -> PixmapId {
        let pixmap = PixmapId(self.alloc_id());
        self.pixmaps.insert(
            pixmap,
            Rc::new(RefCell::new(Surface::filled(width, height, premultiplied(color)))),
        );
        let atom = self.intern("_XROOTPMAP_ID");
        let kind = self.intern("PIXMAP");
        self.set_property(
            self.root,
            atom,
            Property::Present {
                kind,
                format: 32,
                values: vec![pixmap.0],
            },
        );
        pixmap
    }

    /// Queues root exposures, with decreasing counts ending at zero.
    pub fn expose_root(&mut self, rects: &[ScreenRect]) {
        let root = self.root;
        for (i, &rect) in rects.iter().enumerate() {
            let count = u16::try_from(rects.len() - i - 1).unwrap_or(u16::MAX);
            self.notify(Event::Expose {
                window: root,
                rect,
                count,
            });
        }
    }

    /// Queues the failure another compositing manager causes: a rejected
    /// subwindow redirection.
    pub fn reject_redirect(&mut self) {
        self.fail(ErrorCode::Access, COMPOSITE_OPCODE, REDIRECT_SUBWINDOWS);
    }

    /// Queues a failure tagged with `sequence`, as if a request sent then
    /// had failed.
    pub fn inject_error(&mut self, sequence: Sequence, code: ErrorCode) {
        let error = ProtocolError {
            sequence,
            code,
            major_opcode: 0,
            minor_opcode: 0,
        };
        self.events.push_back((Event::Error(error), self.current()));
    }

    /// Advances the request counter by `n`, as if unrelated requests ran.
    pub fn skip_requests(&mut self, n: u64) {
        self.sequence += n;
    }

    // -- Inspection --

    /// Reads back a screen pixel, premultiplied.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Rgba {
        self.windows[&self.root]
            .content
            .borrow()
            .get(x, y)
            .unwrap_or(TRANSPARENT)
    }

    /// Every composite executed so far.
    #[must_use]
    pub fn composites(&self) -> &[CompositeRecord] {
        &self.composites
    }

    /// Forgets recorded composites.
    pub fn clear_composites(&mut self) {
        self.composites.clear();
    }

    /// Number of live regions.
    #[must_use]
    pub fn live_regions(&self) -> usize {
        self.regions.len()
    }

    /// Number of live pictures.
    #[must_use]
    pub fn live_pictures(&self) -> usize {
        self.pictures.len()
    }

    /// Number of live damage objects.
    #[must_use]
    pub fn live_damages(&self) -> usize {
        self.damages.len()
    }

    /// Whether `window` still exists.
    #[must_use]
    pub fn window_exists(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }
}
