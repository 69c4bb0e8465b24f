//! End-to-end wiring of the controls against the map engine: move events
//! drained from the map drive the minimap, and the two viewports must
//! settle instead of ping-ponging.

use noitamap::prelude::*;

fn feed_main_events(map: &mut Map, minimap: &mut MiniMap) {
    for event in map.process_events() {
        match event {
            MapEvent::Move { .. } => minimap.on_main_move(map.viewport()),
            MapEvent::MoveEnd { .. } => minimap.on_main_move_end(map.viewport()),
            _ => {}
        }
    }
}

#[test]
fn minimap_follows_map_moves() {
    let mut map = Map::new(LatLng::new(-0.28, 0.19), 8.0, Point::new(800.0, 600.0));
    let mut minimap = MiniMap::new(MiniMapOptions::default(), map.viewport());

    map.set_view(LatLng::new(-0.4, 0.3), 9.0).unwrap();
    feed_main_events(&mut map, &mut minimap);

    assert_eq!(minimap.overview().zoom, 4.0);
    assert_eq!(minimap.overview().center, LatLng::new(-0.4, 0.3));

    // The overview's own programmatic move-end echoes back harmlessly.
    minimap.on_overview_move_end(map.viewport_mut());
    assert_eq!(map.viewport().zoom, 9.0);
    assert_eq!(map.viewport().center, LatLng::new(-0.4, 0.3));
}

#[test]
fn repeated_moves_settle() {
    let mut map = Map::new(LatLng::new(-0.28, 0.19), 8.0, Point::new(800.0, 600.0));
    let mut minimap = MiniMap::new(MiniMapOptions::default(), map.viewport());

    for _ in 0..3 {
        map.set_view(LatLng::new(-0.4, 0.3), 9.0).unwrap();
        feed_main_events(&mut map, &mut minimap);
        minimap.on_overview_move_end(map.viewport_mut());
    }

    assert_eq!(map.viewport().zoom, 9.0);
    assert_eq!(minimap.overview().zoom, 4.0);
}

#[test]
fn overview_drag_round_trip() {
    let mut map = Map::new(LatLng::new(-0.28, 0.19), 8.0, Point::new(800.0, 600.0));
    let mut minimap = MiniMap::new(MiniMapOptions::default(), map.viewport());
    map.set_view(LatLng::new(-0.3, 0.2), 8.0).unwrap();
    feed_main_events(&mut map, &mut minimap);
    // Consume the echo of the propagated overview move.
    minimap.on_overview_move_end(map.viewport_mut());

    // Drag the overview somewhere else; the main map follows with the
    // offset inverted.
    let target = LatLng::new(-0.5, 0.45);
    minimap.on_overview_move_start();
    minimap.overview_mut().set_center(target);
    minimap.on_overview_move();
    assert!(minimap.shadow_rect().is_some());
    assert_eq!(minimap.overview().zoom, 3.0);
    minimap.on_overview_move_end(map.viewport_mut());

    assert_eq!(map.viewport().center, target);
    assert_eq!(map.viewport().zoom, 8.0);
    assert!(minimap.shadow_rect().is_none());

    // The main map's resulting move-end is consumed, and the aiming
    // rectangle ends up around the new center.
    map.set_view(target, 8.0).unwrap();
    feed_main_events(&mut map, &mut minimap);
    assert!(minimap.aiming_rect().unwrap().contains(&target));
}

#[test]
fn mouse_position_tracks_pointer() {
    let map = Map::new(LatLng::new(-0.28, 0.19), 13.0, Point::new(800.0, 600.0));
    let mut readout = MousePosition::default();

    let pixel = Point::new(120.0, 240.0);
    let lat_lng = map.viewport().pixel_to_lat_lng(&pixel);

    readout.handle_event(&MapEvent::MouseMove { lat_lng, pixel });
    let expected = format!(
        "{} : {}",
        (lat_lng.lat * 1e5).round() / 1e5,
        (lat_lng.lng * 1e5).round() / 1e5
    );
    assert_eq!(readout.text(), expected);

    readout.handle_event(&MapEvent::MouseOut);
    assert_eq!(readout.text(), "Unavailable");
}
