use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;

/// Page size for one API call.
const MAX_POSTS_PER_CALL: usize = 200;

/// Hard cap on fetched posts, mirroring typical timeline API limits.
pub const MAX_POSTS: usize = 3200;

/// Fetches training posts from a remote API, reading from the local cache
/// when one exists.
///
/// The endpoint is expected to return a JSON array of strings and honor
/// `offset`/`limit` paging parameters. Fetched posts are flattened to
/// single lines and written to `cache`, so later runs skip the network.
pub fn fetch_posts(
    url: &str,
    cache: &Path,
    max_posts: usize,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if cache.exists() {
        log::info!("reading cached posts from {}", cache.display());
        return Ok(parrot_core::io::read_lines(cache)?);
    }

    log::info!("grabbing posts from {url}");

    let client = Client::builder().timeout(Duration::new(5, 0)).build()?;
    let max_posts = max_posts.min(MAX_POSTS);

    let mut posts: Vec<String> = Vec::new();
    while posts.len() < max_posts {
        let limit = MAX_POSTS_PER_CALL.min(max_posts - posts.len());
        let page: Vec<String> = client
            .get(url)
            .query(&[("offset", posts.len().to_string()), ("limit", limit.to_string())])
            .send()?
            .error_for_status()?
            .json()?;
        if page.is_empty() {
            break;
        }

        // One phrase per line is the corpus format, newlines cannot survive
        posts.extend(page.into_iter().map(|post| post.replace(['\r', '\n'], " ")));
        log::info!("{:.2}% complete", posts.len() as f64 / max_posts as f64 * 100.0);
    }

    log::info!("writing {} posts to {}", posts.len(), cache.display());
    std::fs::write(cache, posts.join("\n"))?;

    Ok(posts)
}
