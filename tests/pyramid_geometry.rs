//! Cross-source geometry checks: both adapters must agree on the tile
//! grid the full-resolution Noita map produces, and their URLs must match
//! what the respective servers actually accept.

use noitamap::prelude::*;

const MAP_WIDTH: i64 = 51712;
const MAP_HEIGHT: i64 = 74240;

const V2_INFO: &str = r#"{
    "@context": "http://iiif.io/api/image/2/context.json",
    "@id": "https://images.example.org/iiif/noita",
    "width": 51712,
    "height": 74240,
    "tiles": [{"width": 256, "scaleFactors": [1, 2, 4, 8]}],
    "profile": ["http://iiif.io/api/image/2/level2.json"]
}"#;

fn deepzoom_source() -> DeepZoomSource {
    DeepZoomSource::new(
        "https://tiles.example.org/noita/",
        DeepZoomOptions {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            ..Default::default()
        },
    )
    .unwrap()
}

fn iiif_source() -> IiifSource {
    let info = IiifServiceInfo::from_json(V2_INFO).unwrap();
    IiifSource::new(
        "https://images.example.org/iiif/noita/info.json",
        info,
        IiifOptions::default(),
    )
}

#[test]
fn native_grids_agree_across_sources() {
    let dz = deepzoom_source();
    let iiif = iiif_source();

    // Different level numbering, same native geometry: 202x290 tiles.
    for source in [&dz as &dyn TileSource, &iiif as &dyn TileSource] {
        let native = source.max_native_zoom();
        assert!(source.is_valid(&TileRequest::new(native, 201, 289)));
        assert!(!source.is_valid(&TileRequest::new(native, 202, 289)));
        assert!(!source.is_valid(&TileRequest::new(native, 201, 290)));
    }

    assert_eq!(dz.max_native_zoom(), 17);
    assert_eq!(iiif.max_native_zoom(), 9);
}

#[test]
fn level_sizes_grow_monotonically() {
    let dz = deepzoom_source();
    let iiif = iiif_source();

    for table in [dz.table(), iiif.table()] {
        for z in 1..=table.max_native_zoom() {
            let prev = table.level(z - 1).unwrap().image_size;
            let cur = table.level(z).unwrap().image_size;
            assert!(prev.width <= cur.width);
            assert!(prev.height <= cur.height);
        }
    }
}

#[test]
fn edge_tiles_clip_to_image_extent() {
    // 300px wide at tile size 256: two columns, the last 44px wide.
    let source = DeepZoomSource::new(
        "https://t.example/",
        DeepZoomOptions {
            width: 300,
            height: 300,
            ..Default::default()
        },
    )
    .unwrap();

    let native = source.max_native_zoom();
    assert_eq!(
        source.size_of(&TileRequest::new(native, 0, 0)),
        TileSize::new(256, 256)
    );
    assert_eq!(
        source.size_of(&TileRequest::new(native, 1, 1)),
        TileSize::new(44, 44)
    );
}

#[test]
fn deepzoom_url_shape() {
    let source = deepzoom_source();
    assert_eq!(
        source.url_for(&TileRequest::new(13, 7, 11)),
        "https://tiles.example.org/noita/13/7_11.jpeg"
    );
}

#[test]
fn iiif_v2_size_has_one_component() {
    let source = iiif_source();
    let url = source.url_for(&TileRequest::new(9, 201, 289));

    // Native corner tile: region clipped to the image, width-only size.
    assert_eq!(
        url,
        "https://images.example.org/iiif/noita/51456,73984,256,256/256,/0/default.jpg"
    );
}

#[test]
fn iiif_v3_size_has_two_components() {
    let info = IiifServiceInfo::from_json(
        r#"{
            "id": "https://images.example.org/iiif3/noita",
            "type": "ImageService3",
            "width": 51712,
            "height": 74240,
            "tiles": [{"width": 256}],
            "profile": "level2"
        }"#,
    )
    .unwrap();
    let source = IiifSource::new("https://images.example.org/iiif3/noita", info, IiifOptions::default());

    let url = source.url_for(&TileRequest::new(9, 0, 0));
    assert!(url.ends_with("/0,0,256,256/256,256,/0/default.jpg"));
}

#[test]
fn v1_services_get_native_quality() {
    let info = IiifServiceInfo::from_json(
        r#"{
            "width": 4000,
            "height": 3000,
            "tile_width": 256,
            "profile": "http://library.stanford.edu/iiif/image-api/1.1/compliance.html#level2"
        }"#,
    )
    .unwrap();
    assert_eq!(info.quality(), "native");

    let source = IiifSource::new("https://v1.example/img", info, IiifOptions::default());
    assert!(source.url_for(&TileRequest::new(0, 0, 0)).contains("/native.jpg"));
}

#[test]
fn all_visible_tiles_are_within_grid() {
    let layer = TileLayer::new("world", Box::new(iiif_source()));

    // Sweep the full zoom range; every request the layer produces must be
    // one the source considers valid.
    for z in 0..=9 {
        let viewport = Viewport::new(
            LatLng::new(-0.28, 0.19),
            z as f64,
            Point::new(800.0, 600.0),
        );
        for request in layer.visible_tiles(&viewport) {
            assert!(layer.source().is_valid(&request), "invalid request {:?}", request);
            assert_eq!(request.z, z);
        }
    }
}

#[test]
fn iiif_attach_extends_zoom_range_for_small_viewports() {
    let mut layer = TileLayer::new("overview", Box::new(iiif_source()));
    let viewport = Viewport::new(LatLng::default(), 0.0, Point::new(100.0, 100.0));

    assert_eq!(layer.source().min_zoom(), 0);
    layer.attach(&viewport);
    assert_eq!(layer.source().min_zoom(), -1);
    assert!(layer.source().is_valid(&TileRequest::new(-1, 0, 0)));

    layer.detach();
    assert_eq!(layer.source().min_zoom(), 0);
}
