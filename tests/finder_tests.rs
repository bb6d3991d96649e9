use rediscover_weekly::api::mock::{Call, FailOn, MockService};
use rediscover_weekly::error::SyncError;
use rediscover_weekly::finder::{find_playlist, PLAYLIST_PAGE_SIZE};

fn library_with_fillers(n: usize) -> MockService {
    let mock = MockService::new();
    for i in 0..n {
        mock.add_playlist(&format!("filler {}", i), &[]);
    }
    mock
}

#[tokio::test]
async fn finds_playlist_on_first_page() {
    let mock = MockService::new();
    mock.add_playlist("Road trip", &[]);
    let id = mock.add_playlist("Discover Weekly", &["a"]);

    let found = find_playlist(&mock, "Discover Weekly").await.unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.name, "Discover Weekly");
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn finds_playlist_on_later_page() {
    let mock = library_with_fillers(PLAYLIST_PAGE_SIZE * 2 + 3);
    let id = mock.add_playlist("Discover Weekly", &[]);

    let found = find_playlist(&mock, "Discover Weekly").await.unwrap();
    assert_eq!(found.id, id);
    let offsets: Vec<usize> = mock
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::ListPlaylists { offset, limit } => {
                assert_eq!(limit, PLAYLIST_PAGE_SIZE);
                Some(offset)
            }
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![0, 50, 100]);
}

#[tokio::test]
async fn first_match_wins_when_names_repeat() {
    let mock = MockService::new();
    let first = mock.add_playlist("Mix", &[]);
    let _second = mock.add_playlist("Mix", &[]);

    let found = find_playlist(&mock, "Mix").await.unwrap();
    assert_eq!(found.id, first);
}

#[tokio::test]
async fn match_is_exact_and_case_sensitive() {
    let mock = MockService::new();
    mock.add_playlist("discover weekly", &[]);
    mock.add_playlist("Discover Weekly (old)", &[]);

    let err = find_playlist(&mock, "Discover Weekly").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn not_found_only_after_an_empty_page() {
    let mock = library_with_fillers(PLAYLIST_PAGE_SIZE + 1);

    let err = find_playlist(&mock, "Missing").await.unwrap_err();
    match err {
        SyncError::PlaylistNotFound(name) => assert_eq!(name, "Missing"),
        other => panic!("unexpected error: {:?}", other),
    }
    // two populated pages, then the empty page that ends the search
    let calls = mock.calls();
    assert_eq!(
        calls,
        vec![
            Call::ListPlaylists { offset: 0, limit: 50 },
            Call::ListPlaylists { offset: 50, limit: 50 },
            Call::ListPlaylists { offset: 100, limit: 50 },
        ]
    );
}

#[tokio::test]
async fn empty_library_is_not_found() {
    let mock = MockService::new();
    let err = find_playlist(&mock, "Discover Weekly").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn service_errors_are_not_reported_as_not_found() {
    let mock = MockService::new();
    mock.add_playlist("Discover Weekly", &[]);
    mock.fail_on(FailOn::ListPlaylists);

    let err = find_playlist(&mock, "Discover Weekly").await.unwrap_err();
    assert!(matches!(err, SyncError::Service(_)));
    assert!(err.to_string().contains("mock failure"));
}

#[tokio::test]
async fn null_entries_count_toward_the_page_without_ending_the_search() {
    let mock = MockService::new();
    mock.add_null_playlists(PLAYLIST_PAGE_SIZE);
    let id = mock.add_playlist("Discover Weekly", &[]);

    let found = find_playlist(&mock, "Discover Weekly").await.unwrap();
    assert_eq!(found.id, id);
    assert_eq!(
        mock.calls(),
        vec![
            Call::ListPlaylists { offset: 0, limit: 50 },
            Call::ListPlaylists { offset: 50, limit: 50 },
        ]
    );
}

#[tokio::test]
async fn null_entries_never_match() {
    let mock = MockService::new();
    mock.add_null_playlists(3);

    let err = find_playlist(&mock, "").await.unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn mock_reports_its_service_name() {
    use rediscover_weekly::api::MusicService;
    assert_eq!(MockService::new().name(), "mock");
}
