use super::*;
use crate::doc::style::StyleState;

struct Collect(Vec<(i32, i32, i32, i32)>);

impl SegmentSink for Collect {
    fn segment(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        self.0.push((x0, y0, x1, y1));
    }
}

fn square(x: i32, y: i32, side: i32) -> Vec<PathCommand> {
    let p = PathPoint::new;
    vec![
        PathCommand::MoveTo(p(x, y)),
        PathCommand::LineTo(p(x + side, y)),
        PathCommand::LineTo(p(x + side, y + side)),
        PathCommand::LineTo(p(x, y + side)),
    ]
}

#[test]
fn empty_path_has_no_bounds() {
    let path = PathBuffer::new();
    assert!(path.bounds_fine().is_none());
}

#[test]
fn append_scales_to_fine_units() {
    let mut path = PathBuffer::new();
    path.append_commands(&square(0, 0, 16), 0, 0);
    assert_eq!(path.bounds_fine(), Some((0, 0, 128, 128)));
}

#[test]
fn open_subpath_is_closed_implicitly() {
    let mut path = PathBuffer::new();
    path.append_commands(&square(0, 0, 16), 0, 0);

    let mut sink = Collect(Vec::new());
    path.flatten(&mut sink);

    // Three explicit segments plus the implicit closing edge.
    assert_eq!(sink.0.len(), 4);
    let last = sink.0[sink.0.len() - 1];
    assert_eq!((last.2, last.3), (0, 0));
}

#[test]
fn moveto_closes_the_previous_subpath() {
    let mut path = PathBuffer::new();
    let mut cmds = square(0, 0, 8);
    cmds.extend(square(32, 0, 8));
    path.append_commands(&cmds, 0, 0);

    let mut sink = Collect(Vec::new());
    path.flatten(&mut sink);
    assert_eq!(sink.0.len(), 8);

    // First square's closing edge lands back on its own start.
    assert_eq!((sink.0[3].2, sink.0[3].3), (0, 0));
    // Second square closes on its start, not the first one's.
    let last = sink.0[7];
    assert_eq!((last.2, last.3), (32 * 8, 0));
}

#[test]
fn bezier_flattening_hits_the_endpoint_exactly() {
    let mut path = PathBuffer::new();
    let p = PathPoint::new;
    path.append_commands(
        &[
            PathCommand::MoveTo(p(0, 0)),
            PathCommand::CubicBezierTo(p(10, 40)),
            PathCommand::CubicBezierTo(p(30, 40)),
            PathCommand::CubicBezierTo(p(40, 0)),
        ],
        0,
        0,
    );

    let mut sink = Collect(Vec::new());
    path.flatten(&mut sink);

    assert!(!sink.0.is_empty());
    // The curve walk emits the exact polynomial endpoint last, then the
    // subpath closes back to the start.
    let end = sink.0[sink.0.len() - 1];
    assert_eq!((end.2, end.3), (0, 0));
    let before = sink.0[sink.0.len() - 2];
    assert_eq!((before.2, before.3), (40 * 8, 0));
}

#[test]
fn identity_transform_keeps_integer_points() {
    let mut path = PathBuffer::new();
    path.append_commands(&square(2, 3, 16), 0, 0);
    let before = path.bounds_fine();

    let style = StyleState::default();
    path.transform(&style, 0, 0);
    assert_eq!(path.bounds_fine(), before);
}

#[test]
fn scale_transform_doubles_extents() {
    let mut path = PathBuffer::new();
    path.append_commands(&square(0, 0, 16), 0, 0);

    let mut style = StyleState::default();
    style.font_scale_x = 200.0;
    style.font_scale_y = 200.0;
    path.transform(&style, 0, 0);

    assert_eq!(path.bounds_fine(), Some((0, 0, 256, 256)));
}

#[test]
fn z_rotation_swings_points_about_the_origin() {
    let mut path = PathBuffer::new();
    path.push_fine(CmdKind::MoveTo, 100, 0);

    let mut style = StyleState::default();
    style.font_angle_z = 90.0;
    path.transform(&style, 0, 0);

    let (x, y) = path.point_fine(0);
    assert!(x.abs() <= 1, "x was {x}");
    assert!((y + 100).abs() <= 1, "y was {y}");
}
