// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display startup: capability checks, the compositing-manager selection and
//! redirection.

use lucent_core::atoms::Atoms;
use lucent_core::compositor::{Capabilities, Screen};
use lucent_core::id::{Atom, VisualId, WindowId};
use tracing::{debug, info};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::composite::{self, ConnectionExt as _, Redirect};
use x11rb::protocol::damage::{self, ConnectionExt as _};
use x11rb::protocol::render::{self, ConnectionExt as _};
use x11rb::protocol::shape::{self, ConnectionExt as _};
use x11rb::protocol::xfixes::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{self, AtomEnum, ConnectionExt as _, EventMask, PropMode};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use crate::error::BackendError;
use crate::service::{FormatTable, X11Service};

/// Name set on the selection-owner window.
const OWNER_NAME: &[u8] = b"lucent";

/// Everything needed to build a compositor for one screen.
#[derive(Debug)]
pub struct Display {
    /// The service, with the root's children already redirected.
    pub service: X11Service,
    /// The screen being composited.
    pub screen: Screen,
    /// Negotiated capabilities.
    pub caps: Capabilities,
    /// Interned atoms.
    pub atoms: Atoms,
    /// Top-level windows at startup, bottom to top.
    pub windows: Vec<WindowId>,
}

/// Opens `display` (or `$DISPLAY`) and prepares it for compositing.
///
/// Fails when an extension is missing or another compositing manager owns
/// the selection. A redirection rejected by the server is not detected here;
/// it arrives later as an error event the compositor treats as fatal.
pub fn connect(display: Option<&str>) -> Result<Display, BackendError> {
    let (conn, screen_num) = x11rb::connect(display)?;
    let setup_screen = conn
        .setup()
        .roots
        .get(screen_num)
        .cloned()
        .ok_or(BackendError::MissingCapability("screen"))?;
    let root = setup_screen.root;

    let caps = negotiate(&conn)?;
    claim_selection(&conn, screen_num, root)?;

    let atoms = Atoms::intern_with(|name| intern(&conn, name))?;
    let formats = FormatTable::new(conn.render_query_pict_formats()?.reply()?);
    let format = formats
        .for_visual(VisualId(setup_screen.root_visual))
        .ok_or(BackendError::MissingCapability("picture format for the root visual"))?;
    let screen = Screen {
        root: WindowId(root),
        width: setup_screen.width_in_pixels.into(),
        height: setup_screen.height_in_pixels.into(),
        depth: setup_screen.root_depth,
        format,
    };

    conn.grab_server()?;
    conn.composite_redirect_subwindows(root, Redirect::MANUAL)?;
    let mask = EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::EXPOSURE
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::PROPERTY_CHANGE;
    conn.change_window_attributes(root, &xproto::ChangeWindowAttributesAux::new().event_mask(mask))?;
    let windows: Vec<WindowId> = conn
        .query_tree(root)?
        .reply()?
        .children
        .into_iter()
        .map(WindowId)
        .collect();
    conn.ungrab_server()?;
    conn.flush()?;
    info!(
        screen = screen_num,
        width = screen.width,
        height = screen.height,
        windows = windows.len(),
        "display redirected"
    );

    let service = X11Service::new(conn, screen.root, formats, caps.name_window_pixmap);
    Ok(Display {
        service,
        screen,
        caps,
        atoms,
        windows,
    })
}

/// Checks every extension the compositor needs.
fn negotiate(conn: &RustConnection) -> Result<Capabilities, BackendError> {
    let composite_info = conn
        .extension_information(composite::X11_EXTENSION_NAME)?
        .ok_or(BackendError::MissingCapability("Composite extension"))?;
    let version = conn.composite_query_version(0, 2)?.reply()?;
    let name_window_pixmap = version.major_version > 0 || version.minor_version >= 2;
    debug!(
        major = version.major_version,
        minor = version.minor_version,
        "composite"
    );

    for name in [
        damage::X11_EXTENSION_NAME,
        xfixes::X11_EXTENSION_NAME,
        render::X11_EXTENSION_NAME,
        shape::X11_EXTENSION_NAME,
    ] {
        if conn.extension_information(name)?.is_none() {
            return Err(BackendError::MissingCapability(name));
        }
    }
    conn.damage_query_version(1, 1)?.reply()?;
    let xfixes = conn.xfixes_query_version(2, 0)?.reply()?;
    if xfixes.major_version < 2 {
        return Err(BackendError::MissingCapability("XFixes 2.0 regions"));
    }
    conn.render_query_version(0, 11)?.reply()?;
    conn.shape_query_version()?.reply()?;

    Ok(Capabilities {
        composite_opcode: composite_info.major_opcode,
        name_window_pixmap,
    })
}

/// Takes the `_NET_WM_CM_S<n>` selection, failing if someone else holds it.
fn claim_selection(
    conn: &RustConnection,
    screen_num: usize,
    root: xproto::Window,
) -> Result<(), BackendError> {
    let selection = intern(conn, &format!("_NET_WM_CM_S{screen_num}"))?;
    let owner = conn.get_selection_owner(selection.0)?.reply()?.owner;
    if owner != x11rb::NONE {
        return Err(BackendError::AlreadyRunning {
            owner: owner_name(conn, owner)?,
        });
    }

    let window = conn.generate_id()?;
    conn.create_window(
        x11rb::COPY_DEPTH_FROM_PARENT,
        window,
        root,
        0,
        0,
        1,
        1,
        0,
        xproto::WindowClass::INPUT_OUTPUT,
        x11rb::COPY_FROM_PARENT,
        &xproto::CreateWindowAux::new(),
    )?;
    conn.change_property8(
        PropMode::REPLACE,
        window,
        AtomEnum::WM_NAME,
        AtomEnum::STRING,
        OWNER_NAME,
    )?;
    conn.set_selection_owner(window, selection.0, x11rb::CURRENT_TIME)?;
    debug!(window, "compositing selection claimed");
    Ok(())
}

/// Reads `_NET_WM_NAME`, falling back to `WM_NAME`.
fn owner_name(conn: &RustConnection, window: xproto::Window) -> Result<String, BackendError> {
    let net_wm_name = intern(conn, "_NET_WM_NAME")?;
    for property in [net_wm_name.0, AtomEnum::WM_NAME.into()] {
        let reply = conn
            .get_property(false, window, property, AtomEnum::ANY, 0, 256)?
            .reply();
        if let Ok(reply) = reply
            && reply.format == 8
            && !reply.value.is_empty()
        {
            return Ok(String::from_utf8_lossy(&reply.value).into_owned());
        }
    }
    Ok(format!("window {window:#x}"))
}

fn intern(conn: &RustConnection, name: &str) -> Result<Atom, BackendError> {
    Ok(Atom(conn.intern_atom(false, name.as_bytes())?.reply()?.atom))
}
