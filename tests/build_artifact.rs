use loopsmith::{
    BatchOptions, FileTree, RawFile, RuntimeAssets, SourceFolder, group_by_folder, process_batch,
    process_folder,
};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([40, 80, 120, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn raw(path: &str, width: u32, height: u32) -> RawFile {
    RawFile {
        relative_path: path.to_string(),
        bytes: png_bytes(width, height),
        declared_mime: String::new(),
    }
}

fn folder(name: &str, files: Vec<RawFile>) -> SourceFolder {
    SourceFolder {
        name: name.to_string(),
        files,
    }
}

fn entry_html(tree: &FileTree) -> String {
    tree.as_folder()
        .unwrap()
        .leaf("index.htm")
        .unwrap()
        .payload
        .as_text()
        .unwrap()
        .to_string()
}

#[test]
fn artifact_layout_and_slide_order() {
    let source = folder(
        "Storm Loop",
        vec![
            raw("Storm Loop/b.png", 4, 3),
            raw("Storm Loop/a.png", 4, 3),
            raw("Storm Loop/c.png", 4, 3),
        ],
    );
    let built = process_folder(
        &source,
        &RuntimeAssets::placeholder(),
        &BatchOptions::default(),
    )
    .unwrap();

    let root = built.tree.as_folder().unwrap();
    assert_eq!(root.name, "Storm Loop");
    assert_eq!(
        root.leaf("image_001.png").unwrap().original_name.as_deref(),
        Some("a.png")
    );
    assert_eq!(
        root.leaf("image_002.png").unwrap().original_name.as_deref(),
        Some("b.png")
    );
    assert_eq!(
        root.leaf("image_003.png").unwrap().original_name.as_deref(),
        Some("c.png")
    );

    let src = root.folder("src").unwrap();
    assert!(src.leaf("styles.css").is_some());
    assert!(src.leaf("looper.js").is_some());
    assert!(src.leaf("jquery.min.js").is_some());

    let html = entry_html(&built.tree);
    let first = html.find("image_001.png").unwrap();
    let second = html.find("image_002.png").unwrap();
    let third = html.find("image_003.png").unwrap();
    assert!(first < second && second < third);
    assert!(html.contains("<title>Storm Loop</title>"));
}

#[test]
fn natural_sort_drives_sequence_numbers() {
    let source = folder(
        "frames",
        vec![
            raw("frames/img10.png", 2, 2),
            raw("frames/img2.png", 2, 2),
        ],
    );
    let built = process_folder(
        &source,
        &RuntimeAssets::placeholder(),
        &BatchOptions::default(),
    )
    .unwrap();
    let root = built.tree.as_folder().unwrap();
    assert_eq!(
        root.leaf("image_001.png").unwrap().original_name.as_deref(),
        Some("img2.png")
    );
    assert_eq!(
        root.leaf("image_002.png").unwrap().original_name.as_deref(),
        Some("img10.png")
    );
}

#[test]
fn layout_width_from_probe_floors_in_stylesheet() {
    let source = folder("tiny", vec![raw("tiny/a.png", 4, 3)]);
    let built = process_folder(
        &source,
        &RuntimeAssets::placeholder(),
        &BatchOptions::default(),
    )
    .unwrap();
    let css = built
        .tree
        .as_folder()
        .unwrap()
        .folder("src")
        .unwrap()
        .leaf("styles.css")
        .unwrap()
        .payload
        .as_text()
        .unwrap()
        .to_string();
    // 4px probe is far under the floor, so the wrapper clamps to 640.
    assert!(css.contains("max-width: 640px;"));
}

#[test]
fn rebuilding_identical_input_is_idempotent() {
    let source = folder(
        "stable",
        vec![raw("stable/a.png", 3, 3), raw("stable/b.png", 3, 3)],
    );
    let runtime = RuntimeAssets::placeholder();
    let opts = BatchOptions::default();

    let first = process_folder(&source, &runtime, &opts).unwrap();
    let second = process_folder(&source, &runtime, &opts).unwrap();
    assert_eq!(first.tree.fingerprint(), second.tree.fingerprint());
    assert_eq!(first.tree, second.tree);
}

#[test]
fn batch_survives_a_poisoned_folder() {
    let good = folder("good", vec![raw("good/a.png", 2, 2)]);
    let bad = folder(
        "bad",
        vec![RawFile {
            relative_path: "bad/broken.png".to_string(),
            bytes: b"not an image at all".to_vec(),
            declared_mime: String::new(),
        }],
    );
    let built = process_batch(
        &[bad, good],
        &RuntimeAssets::placeholder(),
        &BatchOptions::default(),
    );
    assert_eq!(built.len(), 1);
    assert_eq!(built[0].name, "good");
}

#[test]
fn grouped_files_build_independent_loops() {
    let files = vec![
        raw("alpha/1.png", 2, 2),
        raw("alpha/2.png", 2, 2),
        raw("beta/1.png", 2, 2),
    ];
    let folders = group_by_folder(files);
    let built = process_batch(
        &folders,
        &RuntimeAssets::placeholder(),
        &BatchOptions::default(),
    );
    assert_eq!(built.len(), 2);
    assert_eq!(built[0].name, "alpha");
    assert_eq!(built[0].image_count, 2);
    assert_eq!(built[1].name, "beta");
    assert_eq!(built[1].image_count, 1);
}

#[test]
fn overlay_rides_along_without_renumbering() {
    let source = folder(
        "radar",
        vec![
            raw("radar/frame1.png", 2, 2),
            raw("radar/counties.png", 2, 2),
            raw("radar/frame2.png", 2, 2),
        ],
    );
    let opts = BatchOptions {
        overlay_name: Some("counties.png".to_string()),
        ..BatchOptions::default()
    };
    let built = process_folder(&source, &RuntimeAssets::placeholder(), &opts).unwrap();
    assert!(built.has_overlay);
    assert_eq!(built.image_count, 2);

    let root = built.tree.as_folder().unwrap();
    assert_eq!(
        root.leaf("image_001.png").unwrap().original_name.as_deref(),
        Some("frame1.png")
    );
    assert_eq!(
        root.leaf("image_002.png").unwrap().original_name.as_deref(),
        Some("frame2.png")
    );
    assert!(root.leaf("counties.png").is_some());

    let html = entry_html(&built.tree);
    assert!(html.contains("\"overlay_toggle\": true"));
}

#[test]
fn vendor_placeholder_lands_in_the_artifact() {
    let source = folder("loop", vec![raw("loop/a.png", 2, 2)]);
    let built = process_folder(
        &source,
        &RuntimeAssets::load(None),
        &BatchOptions::default(),
    )
    .unwrap();
    let vendor = built
        .tree
        .as_folder()
        .unwrap()
        .folder("src")
        .unwrap()
        .leaf("jquery.min.js")
        .unwrap()
        .payload
        .as_text()
        .unwrap()
        .to_string();
    assert!(vendor.contains("could not be bundled"));
}
