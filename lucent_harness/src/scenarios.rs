// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end runs of the compositor against the headless display.

use lucent_core::config::CompositorConfig;
use lucent_core::error::{Error, ErrorCode};
use lucent_core::event::Place;
use lucent_core::geometry::{Geometry, ScreenRect};
use lucent_core::id::{Sequence, WindowId};
use lucent_core::mode::Mode;
use lucent_core::service::{Color, Drawable};
use lucent_core::trace::{ErrorEvent, PaintPhase, TraceSink, Tracer, WindowPaintEvent};

use crate::surface::{Rgba, premultiplied};
use crate::{HeadlessCompositor, HeadlessService, WindowSpec, pump, pump_traced, settle, start};

const RED: Color = Color::new(0xffff, 0, 0, 0xffff);
const GREEN: Color = Color::new(0, 0xffff, 0, 0xffff);
const BLUE: Color = Color::new(0, 0, 0xffff, 0xffff);
const HALF_BLUE: Color = Color::new(0, 0, 0xffff, 0x8000);

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

#[derive(Debug, Default)]
struct Recorder {
    painted: Vec<WindowPaintEvent>,
    errors: Vec<ErrorEvent>,
}

impl TraceSink for Recorder {
    fn on_window_painted(&mut self, e: &WindowPaintEvent) {
        self.painted.push(*e);
    }

    fn on_error(&mut self, e: &ErrorEvent) {
        self.errors.push(*e);
    }
}

fn compositor() -> HeadlessCompositor {
    start(HeadlessService::new(WIDTH, HEIGHT), CompositorConfig::default()).unwrap()
}

fn settle_traced(comp: &mut HeadlessCompositor, sink: &mut Recorder) {
    for _ in 0..8 {
        pump_traced(comp, &mut Tracer::new(&mut *sink)).unwrap();
        if comp.service().pending_events() == 0 && !comp.has_pending_damage() {
            return;
        }
    }
    panic!("display did not settle");
}

fn close(actual: Rgba, expected: Rgba) -> bool {
    actual
        .iter()
        .zip(expected)
        .all(|(a, e)| (a - e).abs() < 1e-3)
}

fn mapped(comp: &mut HeadlessCompositor, spec: WindowSpec) -> WindowId {
    let service = comp.service_mut();
    let id = service.create_window(spec);
    service.map_window(id);
    id
}

#[test]
fn three_layers_composite_bottom_to_top() {
    let mut comp = compositor();
    let service = comp.service_mut();
    let a = service.create_window(WindowSpec::new(0, 0, WIDTH, HEIGHT).color(RED));
    let b = service.create_window(WindowSpec::new(0, 0, 32, 24).color(GREEN));
    let c = service.create_window(WindowSpec::new(0, 0, 32, 24).color(HALF_BLUE).argb());
    service.set_opacity(b, Some(0.5));
    for w in [a, b, c] {
        service.map_window(w);
    }

    let mut sink = Recorder::default();
    settle_traced(&mut comp, &mut sink);

    let reg = comp.registry();
    assert_eq!(reg.ids(), [c, b, a], "creation order is stacking order");
    assert_eq!(reg.get(a).unwrap().mode(), Mode::Solid);
    assert_eq!(reg.get(b).unwrap().mode(), Mode::Translucent);
    assert_eq!(reg.get(c).unwrap().mode(), Mode::Argb);

    let order: Vec<_> = sink.painted.iter().map(|e| (e.window, e.phase)).collect();
    assert_eq!(
        order,
        [
            (a, PaintPhase::Opaque),
            (b, PaintPhase::Blend),
            (c, PaintPhase::Blend),
        ],
        "A copied first, then B and C blended in stacking order"
    );

    let pixel = comp.service().pixel(0, 0);
    assert!(close(pixel, [0.25, 0.25, 0.5, 1.0]), "top-left is {pixel:?}");
    let outside = comp.service().pixel(40, 40);
    assert!(close(outside, [1.0, 0.0, 0.0, 1.0]), "only A outside the quadrant: {outside:?}");
    assert!(
        sink.errors.is_empty(),
        "no failures expected: {:?}",
        sink.errors
    );
}

#[test]
fn opaque_window_hides_the_background() {
    let mut comp = compositor();
    let background = comp.service_mut().set_background(4, 4, BLUE);
    let a = mapped(&mut comp, WindowSpec::new(0, 0, WIDTH, HEIGHT).color(RED));
    settle(&mut comp, 8).unwrap();

    comp.service_mut().clear_composites();
    comp.service_mut()
        .draw(a, ScreenRect::new(0, 0, WIDTH, HEIGHT), GREEN);
    assert!(pump(&mut comp).unwrap().is_some(), "damage triggers a pass");

    let tiles: Vec<_> = comp
        .service()
        .composites()
        .iter()
        .filter(|r| r.source == Drawable::Pixmap(background))
        .collect();
    assert!(!tiles.is_empty(), "the background is always requested");
    assert!(
        tiles.iter().all(|r| r.touched == 0),
        "background clipped away: {tiles:?}"
    );
    assert!(close(comp.service().pixel(10, 10), [0.0, 1.0, 0.0, 1.0]));
}

#[test]
fn settled_display_paints_nothing_more() {
    let mut comp = compositor();
    mapped(&mut comp, WindowSpec::new(4, 4, 10, 10).color(RED));
    assert!(settle(&mut comp, 8).unwrap() >= 1, "at least one pass ran");

    let passes = comp.pass_count();
    assert!(pump(&mut comp).unwrap().is_none(), "no damage, no pass");
    assert!(pump(&mut comp).unwrap().is_none(), "still nothing");
    assert_eq!(comp.pass_count(), passes);
}

#[test]
fn raising_twice_equals_raising_once() {
    let mut comp = compositor();
    let a = mapped(&mut comp, WindowSpec::new(0, 0, 8, 8));
    let b = mapped(&mut comp, WindowSpec::new(4, 4, 8, 8));
    let c = mapped(&mut comp, WindowSpec::new(8, 8, 8, 8));
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().ids(), [c, b, a]);

    comp.service_mut().raise_window(a);
    settle(&mut comp, 8).unwrap();
    let once = comp.registry().ids();
    assert_eq!(once, [a, c, b]);

    comp.service_mut().raise_window(a);
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().ids(), once, "second raise changes nothing");

    comp.service_mut().lower_window(a);
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().ids(), [c, b, a], "no sibling below means bottom");

    comp.service_mut().circulate_window(b, Place::OnTop);
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().ids(), [b, c, a]);
}

#[test]
fn racing_destruction_is_suppressed() {
    let mut comp = compositor();
    let a = mapped(&mut comp, WindowSpec::new(0, 0, 16, 16).color(RED));
    settle(&mut comp, 8).unwrap();

    let service = comp.service_mut();
    service.draw(a, ScreenRect::new(0, 0, 4, 4), GREEN);
    service.destroy_window(a);

    let mut sink = Recorder::default();
    settle_traced(&mut comp, &mut sink);
    assert!(!comp.registry().contains(a));
    assert!(!sink.errors.is_empty(), "requests raced against the destruction");
    assert!(
        sink.errors.iter().all(|e| e.suppressed),
        "every failure was expected: {:?}",
        sink.errors
    );
}

#[test]
fn unmap_then_destroy_releases_once() {
    let mut comp = compositor();
    let a = mapped(&mut comp, WindowSpec::new(0, 0, 16, 16).color(RED));
    let mut sink = Recorder::default();
    settle_traced(&mut comp, &mut sink);
    assert!(comp.registry().get(a).unwrap().has_picture());

    comp.service_mut().unmap_window(a);
    settle_traced(&mut comp, &mut sink);
    let window = comp.registry().get(a).unwrap();
    assert!(!window.has_picture(), "unmap released the picture");
    assert!(!window.has_extents());

    comp.service_mut().destroy_window(a);
    settle_traced(&mut comp, &mut sink);
    assert!(comp.registry().is_empty());
    let double_frees: Vec<_> = sink
        .errors
        .iter()
        .filter(|e| {
            matches!(
                e.error.code,
                ErrorCode::BadPicture | ErrorCode::Pixmap | ErrorCode::BadRegion
            )
        })
        .collect();
    assert!(double_frees.is_empty(), "released twice: {double_frees:?}");
    assert!(sink.errors.iter().all(|e| e.suppressed), "{:?}", sink.errors);

    let service = comp.shutdown().unwrap();
    assert_eq!(service.live_pictures(), 0, "pictures leaked");
    assert_eq!(service.live_regions(), 0, "regions leaked");
    assert_eq!(service.live_damages(), 0, "damage objects leaked");
}

#[test]
fn unmapping_reveals_what_was_below() {
    let mut comp = compositor();
    mapped(&mut comp, WindowSpec::new(0, 0, WIDTH, HEIGHT).color(RED));
    let top = mapped(&mut comp, WindowSpec::new(0, 0, 16, 16).color(GREEN));
    settle(&mut comp, 8).unwrap();
    assert!(close(comp.service().pixel(1, 1), [0.0, 1.0, 0.0, 1.0]));

    comp.service_mut().unmap_window(top);
    settle(&mut comp, 8).unwrap();
    assert!(close(comp.service().pixel(1, 1), [1.0, 0.0, 0.0, 1.0]), "red again");
}

#[test]
fn classification_follows_opacity_changes() {
    let mut comp = compositor();
    let w = mapped(&mut comp, WindowSpec::new(0, 0, 16, 16).color(RED));
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().get(w).unwrap().mode(), Mode::Solid);

    comp.service_mut().set_opacity(w, Some(0.5));
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().get(w).unwrap().mode(), Mode::Translucent);
    let grey = premultiplied(Color::GREY);
    let blended = [
        0.5 + grey[0] * 0.5,
        grey[1] * 0.5,
        grey[2] * 0.5,
        1.0,
    ];
    let pixel = comp.service().pixel(2, 2);
    assert!(close(pixel, blended), "half red over grey: {pixel:?}");

    comp.service_mut().set_opacity(w, None);
    settle(&mut comp, 8).unwrap();
    let window = comp.registry().get(w).unwrap();
    assert_eq!(window.mode(), Mode::Solid);
    assert!(!window.has_alpha_mask(), "mask dropped with the translucency");
    assert!(close(comp.service().pixel(2, 2), [1.0, 0.0, 0.0, 1.0]));
}

#[test]
fn root_exposures_are_batched() {
    let mut comp = compositor();
    settle(&mut comp, 8).unwrap();

    comp.service_mut().expose_root(&[
        ScreenRect::new(0, 0, 4, 4),
        ScreenRect::new(10, 10, 4, 4),
        ScreenRect::new(20, 20, 4, 4),
    ]);
    let events = comp.service_mut().take_events();
    assert_eq!(events.len(), 3);
    for (i, (event, sequence)) in events.into_iter().enumerate() {
        comp.handle_event(event, sequence).unwrap();
        assert_eq!(
            comp.has_pending_damage(),
            i == 2,
            "damage only after the last exposure"
        );
    }
    assert!(comp.flush().unwrap().is_some());
}

#[test]
fn shaped_window_shows_background_outside_its_shape() {
    let mut comp = compositor();
    let w = mapped(&mut comp, WindowSpec::new(0, 0, 32, 32).color(RED));
    settle(&mut comp, 8).unwrap();
    assert!(close(comp.service().pixel(20, 20), [1.0, 0.0, 0.0, 1.0]));

    comp.service_mut()
        .set_shape(w, Some(&[ScreenRect::new(0, 0, 8, 8)]));
    settle(&mut comp, 8).unwrap();
    let window = comp.registry().get(w).unwrap();
    assert!(window.is_shaped());
    assert_eq!(window.shape_bounds(), ScreenRect::new(0, 0, 8, 8));
    assert!(close(comp.service().pixel(4, 4), [1.0, 0.0, 0.0, 1.0]), "inside the shape");
    let grey = premultiplied(Color::GREY);
    assert!(close(comp.service().pixel(20, 20), grey), "outside the shape");
}

#[test]
fn moving_a_window_repaints_old_and_new_area() {
    let mut comp = compositor();
    let w = mapped(&mut comp, WindowSpec::new(0, 0, 8, 8).color(RED));
    settle(&mut comp, 8).unwrap();

    let moved = Geometry {
        x: 30,
        y: 30,
        width: 8,
        height: 8,
        border_width: 0,
    };
    comp.service_mut().configure_window(w, moved);
    settle(&mut comp, 8).unwrap();
    let grey = premultiplied(Color::GREY);
    assert!(close(comp.service().pixel(2, 2), grey), "old spot cleared");
    assert!(close(comp.service().pixel(32, 32), [1.0, 0.0, 0.0, 1.0]), "new spot drawn");
    assert_eq!(comp.registry().get(w).unwrap().geometry(), moved);
}

#[test]
fn argb_window_with_opacity_uses_both_alphas() {
    let mut comp = compositor();
    mapped(&mut comp, WindowSpec::new(0, 0, WIDTH, HEIGHT).color(RED));
    let w = comp
        .service_mut()
        .create_window(WindowSpec::new(0, 0, 16, 16).color(HALF_BLUE).argb());
    comp.service_mut().set_opacity(w, Some(0.5));
    comp.service_mut().map_window(w);
    settle(&mut comp, 8).unwrap();

    let window = comp.registry().get(w).unwrap();
    assert_eq!(window.mode(), Mode::Argb);
    assert!(window.has_alpha_mask(), "opacity applied through a mask");
    let pixel = comp.service().pixel(4, 4);
    assert!(close(pixel, [0.75, 0.0, 0.25, 1.0]), "quarter blue over red: {pixel:?}");
}

#[test]
fn window_moved_off_screen_is_skipped() {
    let mut comp = compositor();
    let w = mapped(&mut comp, WindowSpec::new(0, 0, 8, 8).color(RED));
    settle(&mut comp, 8).unwrap();

    let away = Geometry {
        x: 200,
        y: 200,
        width: 8,
        height: 8,
        border_width: 0,
    };
    comp.service_mut().configure_window(w, away);
    let mut sink = Recorder::default();
    settle_traced(&mut comp, &mut sink);
    assert!(
        sink.painted.iter().all(|e| e.window != w),
        "off-screen window painted"
    );
    assert!(close(comp.service().pixel(2, 2), premultiplied(Color::GREY)));
}

#[test]
fn resizing_drops_the_window_pixmap() {
    let mut comp = compositor();
    let w = mapped(&mut comp, WindowSpec::new(0, 0, 8, 8).color(RED));
    settle(&mut comp, 8).unwrap();

    let bigger = Geometry {
        x: 0,
        y: 0,
        width: 20,
        height: 20,
        border_width: 0,
    };
    comp.service_mut().configure_window(w, bigger);
    settle(&mut comp, 8).unwrap();
    assert!(
        close(comp.service().pixel(15, 15), [1.0, 0.0, 0.0, 1.0]),
        "new content read from the new pixmap"
    );
}

#[test]
fn reparenting_away_and_back() {
    let mut comp = compositor();
    let frame = mapped(&mut comp, WindowSpec::new(0, 0, 20, 20));
    let client = mapped(&mut comp, WindowSpec::new(2, 2, 10, 10).color(RED));
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().ids(), [client, frame]);

    comp.service_mut().reparent_window(client, frame);
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().ids(), [frame], "no longer top-level");

    let root = comp.service().root();
    comp.service_mut().reparent_window(client, root);
    settle(&mut comp, 8).unwrap();
    assert_eq!(comp.registry().ids(), [client, frame], "back on top");
}

#[test]
fn background_change_repaints_the_desktop() {
    let mut comp = compositor();
    settle(&mut comp, 8).unwrap();
    let grey = premultiplied(Color::GREY);
    assert!(close(comp.service().pixel(5, 5), grey), "fallback tile");

    comp.service_mut().set_background(2, 2, BLUE);
    settle(&mut comp, 8).unwrap();
    assert!(close(comp.service().pixel(5, 5), [0.0, 0.0, 1.0, 1.0]), "new background");
}

#[test]
fn growing_the_root_repaints_at_the_new_size() {
    let mut comp = compositor();
    settle(&mut comp, 8).unwrap();
    let pictures = comp.service().live_pictures();

    comp.service_mut().resize_root(96, 64);
    pump(&mut comp).unwrap();
    let screen = comp.screen();
    assert_eq!((screen.width, screen.height), (96, 64));

    comp.service_mut().expose_root(&[ScreenRect::new(0, 0, 96, 64)]);
    settle(&mut comp, 8).unwrap();
    let grey = premultiplied(Color::GREY);
    assert!(close(comp.service().pixel(90, 60), grey), "grown area painted");
    assert_eq!(comp.service().live_pictures(), pictures, "old buffer freed");
}

#[test]
fn input_only_windows_are_never_painted() {
    let mut comp = compositor();
    let w = mapped(&mut comp, WindowSpec::new(0, 0, 16, 16).input_only());
    let mut sink = Recorder::default();
    settle_traced(&mut comp, &mut sink);
    let window = comp.registry().get(w).unwrap();
    assert!(!window.tracks_damage());
    assert!(sink.painted.is_empty(), "{:?}", sink.painted);
}

#[test]
fn window_type_found_on_a_child() {
    let mut comp = compositor();
    let service = comp.service_mut();
    let frame = service.create_window(WindowSpec::new(0, 0, 20, 20));
    let client = service.create_child(frame, WindowSpec::new(0, 0, 20, 20));
    service.set_window_type(client, "_NET_WM_WINDOW_TYPE_DOCK");
    settle(&mut comp, 8).unwrap();
    assert_eq!(
        comp.registry().get(frame).unwrap().window_type(),
        lucent_core::atoms::WindowType::Dock
    );
}

#[test]
fn monitor_mode_paints_straight_to_the_screen() {
    let config = CompositorConfig {
        monitor_repaint: true,
        ..CompositorConfig::default()
    };
    let mut comp = start(HeadlessService::new(WIDTH, HEIGHT), config).unwrap();
    mapped(&mut comp, WindowSpec::new(0, 0, 8, 8).color(RED));
    settle(&mut comp, 8).unwrap();

    let root = comp.root_picture();
    assert!(
        comp.service().composites().iter().all(|r| r.dst == root),
        "no off-screen buffer"
    );
    assert!(close(comp.service().pixel(1, 1), [1.0, 0.0, 0.0, 1.0]));
}

#[test]
fn unexpected_failures_are_reported_not_fatal() {
    let mut comp = compositor();
    settle(&mut comp, 8).unwrap();
    let far = Sequence(comp.service().current().0 + 100);
    comp.service_mut().inject_error(far, ErrorCode::Value);

    let mut sink = Recorder::default();
    settle_traced(&mut comp, &mut sink);
    assert_eq!(sink.errors.len(), 1);
    assert!(!sink.errors[0].suppressed, "nobody expected it");
}

#[test]
fn another_compositor_is_fatal() {
    let mut comp = compositor();
    comp.service_mut().reject_redirect();
    let err = pump(&mut comp).unwrap_err();
    assert!(
        matches!(err, Error::AnotherCompositor { .. }),
        "got {err:?}"
    );
}
