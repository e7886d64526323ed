mod common;

use common::{HostEvent, MockHost};
use qol_bar::font::{BarFont, MAX_FONT_SIZE};

#[test]
fn rebuild_leaves_exactly_one_live_handle() {
    let mut host = MockHost::new();
    let mut font = BarFont::new();

    font.setup(&mut host, 17.0).expect("first build");
    let first = font.handle().expect("handle");
    font.setup(&mut host, 24.0).expect("second build");
    let second = font.handle().expect("handle");

    assert_ne!(first, second);
    assert_eq!(host.live_fonts.len(), 1);

    // The first handle is fully destroyed before the second is requested.
    let destroy_idx = host
        .events
        .iter()
        .position(|e| *e == HostEvent::DestroyFont(first))
        .expect("first destroyed");
    let build_idx = host
        .events
        .iter()
        .position(|e| matches!(e, HostEvent::BuildFont(id, _) if *id == second))
        .expect("second built");
    assert!(destroy_idx < build_idx);
}

#[test]
fn size_is_clamped_to_the_valid_range() {
    let mut host = MockHost::new();
    let mut font = BarFont::new();

    font.setup(&mut host, 500.0).expect("build");
    font.setup(&mut host, 0.25).expect("build");

    let sizes: Vec<f32> = host
        .events
        .iter()
        .filter_map(|e| match e {
            HostEvent::BuildFont(_, size) => Some(*size),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![MAX_FONT_SIZE, 1.0]);
}

#[test]
fn failed_build_leaves_no_live_handle() {
    let mut host = MockHost::new();
    let mut font = BarFont::new();
    font.setup(&mut host, 17.0).expect("build");

    host.fail_font = true;
    assert!(font.setup(&mut host, 20.0).is_err());
    assert_eq!(font.handle(), None);
    assert!(host.live_fonts.is_empty());
}

#[test]
fn dispose_is_idempotent() {
    let mut host = MockHost::new();
    let mut font = BarFont::new();
    font.setup(&mut host, 17.0).expect("build");

    font.dispose(&mut host);
    font.dispose(&mut host);
    assert!(host.live_fonts.is_empty());
    assert_eq!(font.handle(), None);

    let destroys = host
        .events
        .iter()
        .filter(|e| matches!(e, HostEvent::DestroyFont(_)))
        .count();
    assert_eq!(destroys, 1);
}
