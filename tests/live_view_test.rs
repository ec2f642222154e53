//! Live children views versus snapshots across tree mutation.

use domwalk::{ArenaDom, ArenaNodeId, ElementRef, parse_html};

fn ids(dom: &ArenaDom, parent: ArenaNodeId) -> Vec<String> {
    ElementRef::new(dom, parent)
        .children()
        .into_iter()
        .map(|c| c.element_id().unwrap_or_default().to_string())
        .collect()
}

fn grid() -> (ArenaDom, ArenaNodeId) {
    let dom = parse_html(
        r#"<section id="grid">
            <div class="card" id="c1"></div>
            <div class="card" id="c2"></div>
        </section>"#,
    );
    let grid = dom.get_by_id("grid").unwrap();
    (dom, grid)
}

#[test]
fn test_live_handle_sees_appends_and_removals() {
    let (mut dom, grid) = grid();
    let live = ElementRef::new(&dom, grid).live_children();
    assert_eq!(live.len(&dom), 2);

    let c3 = dom.create_html_element("div", &[("id", "c3")]);
    dom.append(grid, c3);
    assert_eq!(live.len(&dom), 3);
    assert_eq!(live.get(&dom, 2).map(|el| el.id()), Some(c3));

    let c1 = dom.get_by_id("c1").unwrap();
    dom.detach(c1);
    assert_eq!(live.len(&dom), 2);
    assert_eq!(ids(&dom, grid), vec!["c2", "c3"]);
}

#[test]
fn test_snapshot_keeps_old_membership() {
    let (mut dom, grid) = grid();
    let snapshot = ElementRef::new(&dom, grid).children().to_list();
    assert_eq!(snapshot.len(), 2);

    let c0 = dom.create_html_element("div", &[("id", "c0")]);
    let c1 = dom.get_by_id("c1").unwrap();
    dom.insert_before(c1, c0);
    dom.detach(c1);

    // Snapshot is unchanged
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get(0), Some(c1));
    let snapshot_ids: Vec<_> = snapshot
        .iter_in(&dom)
        .filter_map(|el| el.element_id())
        .collect();
    assert_eq!(snapshot_ids, vec!["c1", "c2"]);

    // A fresh read reflects the current tree
    assert_eq!(ids(&dom, grid), vec!["c0", "c2"]);
}

#[test]
fn test_requery_after_reorder() {
    let (mut dom, grid) = grid();
    let c1 = dom.get_by_id("c1").unwrap();
    let c2 = dom.get_by_id("c2").unwrap();

    assert_eq!(ElementRef::new(&dom, c1).next_sibling().map(|e| e.id()), Some(c2));

    // Move c1 to the end
    dom.append(grid, c1);
    assert_eq!(ids(&dom, grid), vec!["c2", "c1"]);
    assert_eq!(ElementRef::new(&dom, c1).next_sibling(), None);
    assert_eq!(
        ElementRef::new(&dom, c1).previous_sibling().map(|e| e.id()),
        Some(c2)
    );
    assert_eq!(ElementRef::new(&dom, grid).first_child().map(|e| e.id()), Some(c2));
}

#[test]
fn test_detached_node_navigation() {
    let (mut dom, grid) = grid();
    let c2 = dom.get_by_id("c2").unwrap();
    dom.detach(c2);

    let card = ElementRef::new(&dom, c2);
    assert_eq!(card.parent(), None);
    assert_eq!(card.previous_sibling(), None);
    assert!(!ElementRef::new(&dom, grid).children().contains(card));
    assert_eq!(card.closest(|el| el.element_id() == Some("grid")), None);
}

#[test]
fn test_live_handle_on_emptied_parent() {
    let (mut dom, grid) = grid();
    let live = ElementRef::new(&dom, grid).live_children();

    let all: Vec<_> = live.view(&dom).to_list().ids().to_vec();
    for id in all {
        dom.detach(id);
    }

    assert!(live.is_empty(&dom));
    assert_eq!(live.get(&dom, 0), None);
    assert_eq!(ElementRef::new(&dom, grid).first_child(), None);
    assert_eq!(ElementRef::new(&dom, grid).last_child(), None);
}
