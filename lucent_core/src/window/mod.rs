// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Managed windows and the stacking-ordered registry holding them.

mod managed;
mod registry;

pub use managed::{ManagedWindow, Transition};
pub use registry::{StackPosition, WindowRegistry};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::WindowType;
    use crate::geometry::{Geometry, MapState};
    use crate::id::WindowId;
    use crate::ledger::{Requests, SuppressionLedger};
    use crate::service::{Drawable, PictureOptions, RenderService, WindowAttributes};
    use crate::testing::RecordingService;

    fn populated(service: &mut RecordingService) -> ManagedWindow {
        let attrs = WindowAttributes {
            geometry: Geometry {
                x: 5,
                y: 5,
                width: 20,
                height: 10,
                border_width: 1,
            },
            map_state: MapState::Viewable,
            ..WindowAttributes::default()
        };
        let id = WindowId(0x100);
        service.windows.insert(id, attrs);
        let damage = service.create_damage(id).unwrap();
        let mut w = ManagedWindow::new(id, attrs, Some(damage), WindowType::Normal);
        let format = service.visual_format(attrs.visual).unwrap().unwrap();
        let r = &mut w.resources;
        r.pixmap = service.name_window_pixmap(id).unwrap();
        r.picture = Some(
            service
                .create_picture(Drawable::Window(id), format, PictureOptions::default())
                .unwrap(),
        );
        r.extents = Some(service.create_region(&[attrs.geometry.extents()]).unwrap());
        r.border_size = Some(service.create_region_from_window(id).unwrap());
        r.border_clip = Some(service.create_region(&[]).unwrap());
        w.damaged = true;
        w
    }

    #[test]
    fn unmap_then_destroy_releases_each_resource_once() {
        let mut service = RecordingService::default();
        let mut ledger = SuppressionLedger::new();
        let mut w = populated(&mut service);

        let mut req = Requests::new(&mut service, &mut ledger);
        let extents = w.release(Transition::Unmap, &mut req).unwrap();
        assert!(extents.is_some(), "unmap hands back the extents");
        assert!(!w.is_damaged());
        assert!(!w.has_picture());
        let extents_region = extents.unwrap();

        // A repeated unmap and the destroy find nothing left to free but the
        // damage object; a double free would panic in the service.
        assert_eq!(w.release(Transition::Unmap, &mut req).unwrap(), None);
        assert_eq!(w.release(Transition::Destroy, &mut req).unwrap(), None);
        assert!(!w.tracks_damage());

        service.destroy_region(extents_region).unwrap();
        assert_eq!(service.live_regions(), 0, "every region was released");
        assert_eq!(service.live_pictures(), 0, "every picture was released");
        assert_eq!(service.live_damages(), 0, "the damage object was released");
        assert!(!ledger.is_empty(), "racy releases were registered");
    }

    #[test]
    fn resize_keeps_picture_without_named_pixmap() {
        let mut service = RecordingService::default();
        let mut ledger = SuppressionLedger::new();
        let mut w = populated(&mut service);
        let pixmap = w.resources.pixmap.take().unwrap();
        service.free_pixmap(pixmap).unwrap();

        let mut req = Requests::new(&mut service, &mut ledger);
        w.release(Transition::Resize, &mut req).unwrap();
        assert!(w.has_picture(), "window-drawable pictures survive a resize");
        w.release(Transition::ClipChanged, &mut req).unwrap();
        assert!(!w.has_extents());
    }
}
