// End-to-end exercise of the home screen: paging, optimistic star,
// rollback, and teardown against a scripted in-memory gateway.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use forgefeed_core::models::{FeedItem, FeedPage, FeedRepo, RepoDetails};
use forgefeed_core::screens::HomeScreen;
use forgefeed_core::{Error, Gateway, Result, ToggleOutcome};

struct ScriptedGateway {
    pages: Mutex<VecDeque<Result<FeedPage>>>,
    star_results: Mutex<VecDeque<Result<()>>>,
    star_calls: AtomicUsize,
}

impl ScriptedGateway {
    fn new(pages: Vec<Result<FeedPage>>, star_results: Vec<Result<()>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            star_results: Mutex::new(star_results.into()),
            star_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl Gateway for ScriptedGateway {
    async fn fetch_feed(&self, _cursor: Option<String>) -> Result<FeedPage> {
        self.pages.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(FeedPage {
                items: vec![],
                next_cursor: None,
            })
        })
    }

    async fn fetch_repo_details(&self, owner: &str, name: &str) -> Result<RepoDetails> {
        Err(Error::NotFound(format!("{}/{}", owner, name)))
    }

    async fn set_star(&self, _repo_id: &str, _active: bool) -> Result<()> {
        self.star_calls.fetch_add(1, Ordering::SeqCst);
        self.star_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn set_follow(&self, _subject_id: &str, _active: bool) -> Result<()> {
        Ok(())
    }

    async fn delete_access_token(&self, _token: &str) -> Result<()> {
        Ok(())
    }
}

fn repo(id: &str, stars: u64, starred: bool) -> FeedItem {
    FeedItem::CreatedRepo {
        repo: FeedRepo {
            id: id.to_string(),
            name: format!("repo-{id}"),
            owner: "octocat".into(),
            description: None,
            language: Some("Rust".into()),
            stargazer_count: stars,
            viewer_has_starred: starred,
        },
    }
}

#[tokio::test]
async fn home_screen_paging_and_optimistic_star() {
    let gateway = Arc::new(ScriptedGateway::new(
        vec![
            Ok(FeedPage {
                items: vec![repo("r1", 10, false), repo("r2", 5, true)],
                next_cursor: Some("c1".into()),
            }),
            Ok(FeedPage {
                items: vec![repo("r3", 1, false)],
                next_cursor: None,
            }),
        ],
        vec![Ok(()), Err(Error::NetworkError("flaky".into()))],
    ));
    let screen = Arc::new(HomeScreen::new(gateway.clone()));

    // Refresh loads the head page and seeds relationships from it
    screen.refresh().await;
    let snap = screen.snapshot();
    assert_eq!(snap.rows.len(), 2);
    assert!(!snap.rows[0].relationship.active);
    assert!(snap.rows[1].relationship.active);
    assert!(!snap.end_of_stream);

    // Load-more appends in order and reaches end-of-stream
    screen.load_more().await;
    let snap = screen.snapshot();
    let ids: Vec<_> = snap
        .rows
        .iter()
        .map(|row| row.item.subject_id().to_string())
        .collect();
    assert_eq!(ids, vec!["r1", "r2", "r3"]);
    assert!(snap.end_of_stream);

    // Star r1: applied optimistically, confirmed by the server
    assert_eq!(screen.toggle_star("r1").await, ToggleOutcome::Confirmed);
    let row = &screen.snapshot().rows[0];
    assert!(row.relationship.active);
    assert_eq!(row.relationship.apply_to(10), 11);

    // Unstar fails: server says no, state snaps back to starred
    assert_eq!(screen.toggle_star("r1").await, ToggleOutcome::RolledBack);
    let row = &screen.snapshot().rows[0];
    assert!(row.relationship.active);
    assert_eq!(row.relationship.apply_to(10), 11);

    assert_eq!(gateway.star_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn home_screen_error_and_recovery() {
    let gateway = Arc::new(ScriptedGateway::new(
        vec![
            Ok(FeedPage {
                items: vec![repo("r1", 10, false)],
                next_cursor: Some("c1".into()),
            }),
            Err(Error::NetworkError("offline".into())),
            Ok(FeedPage {
                items: vec![repo("r2", 3, false)],
                next_cursor: None,
            }),
        ],
        vec![],
    ));
    let screen = HomeScreen::new(gateway);

    screen.refresh().await;
    screen.load_more().await;

    // The failed page left the loaded items alone and raised the flag
    let snap = screen.snapshot();
    assert_eq!(snap.rows.len(), 1);
    assert!(snap.has_error);

    // User-initiated retry succeeds and clears the flag
    screen.load_more().await;
    let snap = screen.snapshot();
    assert_eq!(snap.rows.len(), 2);
    assert!(!snap.has_error);
}

#[tokio::test]
async fn closed_screen_rejects_new_work() {
    let gateway = Arc::new(ScriptedGateway::new(
        vec![Ok(FeedPage {
            items: vec![repo("r1", 10, false)],
            next_cursor: Some("c1".into()),
        })],
        vec![],
    ));
    let screen = HomeScreen::new(gateway);

    screen.refresh().await;
    screen.close();

    // After teardown nothing mutates: no fetches land, toggles discard
    screen.load_more().await;
    assert_eq!(screen.snapshot().rows.len(), 1);
    assert_eq!(screen.toggle_star("r1").await, ToggleOutcome::Rejected);
}
