use storefront_api::pagination::{
    self, MAX_PER_PAGE, Page, PageError, num_pages, page_size, resolve_lenient, resolve_strict,
};

#[test]
fn empty_result_still_has_one_page() {
    assert_eq!(num_pages(0, 2), 1);
    let page = resolve_strict(None, 2, 0).expect("first page");
    assert_eq!(page.number, 1);
    assert_eq!(page.offset(), 0);
    assert!(!page.has_next());
}

#[test]
fn strict_resolution_rejects_bad_pages() {
    assert_eq!(resolve_strict(Some("abc"), 2, 5), Err(PageError::NotAnInteger));
    assert_eq!(resolve_strict(Some("0"), 2, 5), Err(PageError::Empty));
    assert_eq!(resolve_strict(Some("4"), 2, 5), Err(PageError::Empty));
}

#[test]
fn strict_resolution_accepts_last() {
    let page = resolve_strict(Some("last"), 2, 5).expect("last page");
    assert_eq!(
        page,
        Page {
            number: 3,
            per_page: 2,
            total: 5,
            num_pages: 3,
        }
    );
    assert_eq!(page.offset(), 4);
    assert!(page.has_previous());
    assert!(!page.has_next());
}

#[test]
fn lenient_resolution_falls_back() {
    assert_eq!(resolve_lenient(Some("abc"), 1, 4).number, 1);
    assert_eq!(resolve_lenient(None, 1, 4).number, 1);
    assert_eq!(resolve_lenient(Some("99"), 1, 4).number, 4);
    assert_eq!(resolve_lenient(Some("-3"), 1, 4).number, 4);
    assert_eq!(resolve_lenient(Some(" 2 "), 1, 4).number, 2);
}

#[test]
fn lenient_resolution_treats_last_as_not_a_number() {
    assert_eq!(resolve_lenient(Some("last"), 1, 4).number, 1);
    assert_eq!(resolve_strict(Some("last"), 1, 4).map(|p| p.number), Ok(4));
}

#[test]
fn page_size_is_clamped() {
    assert_eq!(page_size(None, pagination::ORDERS_PER_PAGE), 3);
    assert_eq!(page_size(Some(0), 2), 1);
    assert_eq!(page_size(Some(10_000), 2), MAX_PER_PAGE);
}

#[test]
fn meta_reports_page_count() {
    let meta = resolve_strict(Some("2"), 3, 7).expect("page").meta();
    assert_eq!(meta.page, Some(2));
    assert_eq!(meta.per_page, Some(3));
    assert_eq!(meta.total, Some(7));
    assert_eq!(meta.num_pages, Some(3));
}
