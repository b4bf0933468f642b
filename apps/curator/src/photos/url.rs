//! URL identity heuristics for photo deduplication.
//!
//! CDNs serve the same image under many URLs that differ only in requested
//! size. Stripping resize parameters lets those count once.

/// Query parameters that only change the rendition, not the image.
const RESIZE_PARAMS: &[&str] = &[
    "w",
    "h",
    "width",
    "height",
    "size",
    "sz",
    "maxwidth",
    "maxheight",
    "max_w",
    "max_h",
    "resize",
    "fit",
    "crop",
    "dpr",
    "quality",
    "q",
    "auto",
    "fm",
];

/// Normalizes a photo URL for near-duplicate detection.
///
/// - scheme and host are lower-cased
/// - the fragment is dropped
/// - resize query parameters are removed, the rest sorted
pub fn normalize_photo_url(url: &str) -> String {
    let url = url.trim();
    let without_fragment = url.split('#').next().unwrap_or(url);
    let (base, query) = match without_fragment.split_once('?') {
        Some((b, q)) => (b, Some(q)),
        None => (without_fragment, None),
    };

    let base = lowercase_scheme_and_host(base);

    let mut kept: Vec<&str> = query
        .map(|q| {
            q.split('&')
                .filter(|pair| !pair.is_empty())
                .filter(|pair| {
                    let key = pair.split('=').next().unwrap_or("");
                    !RESIZE_PARAMS.contains(&key.to_ascii_lowercase().as_str())
                })
                .collect()
        })
        .unwrap_or_default();
    kept.sort_unstable();

    if kept.is_empty() {
        base
    } else {
        format!("{}?{}", base, kept.join("&"))
    }
}

fn lowercase_scheme_and_host(base: &str) -> String {
    match base.split_once("://") {
        Some((scheme, rest)) => {
            let (host, path) = match rest.find('/') {
                Some(idx) => rest.split_at(idx),
                None => (rest, ""),
            };
            format!(
                "{}://{}{}",
                scheme.to_ascii_lowercase(),
                host.to_ascii_lowercase(),
                path
            )
        }
        None => base.to_string(),
    }
}

/// Extracts width/height hints from resize parameters, if the URL carries them.
pub fn dimension_hints(url: &str) -> (Option<u32>, Option<u32>) {
    let query = match url.split('#').next().and_then(|u| u.split_once('?')) {
        Some((_, q)) => q,
        None => return (None, None),
    };

    let mut width = None;
    let mut height = None;
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let Ok(value) = value.parse::<u32>() else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "w" | "width" | "maxwidth" | "max_w" => width = Some(value),
            "h" | "height" | "maxheight" | "max_h" => height = Some(value),
            _ => {}
        }
    }
    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_params_are_stripped() {
        assert_eq!(
            normalize_photo_url("https://cdn.example.com/h/1.jpg?w=800&h=600"),
            normalize_photo_url("https://cdn.example.com/h/1.jpg?w=2000&h=1300")
        );
    }

    #[test]
    fn test_other_params_are_kept_and_sorted() {
        assert_eq!(
            normalize_photo_url("https://cdn.example.com/p.jpg?v=2&id=7&w=100"),
            "https://cdn.example.com/p.jpg?id=7&v=2"
        );
    }

    #[test]
    fn test_host_is_case_insensitive_but_path_is_not() {
        assert_eq!(
            normalize_photo_url("HTTPS://CDN.Example.com/Photo.JPG#top"),
            "https://cdn.example.com/Photo.JPG"
        );
    }

    #[test]
    fn test_different_paths_stay_distinct() {
        assert_ne!(
            normalize_photo_url("https://cdn/a.jpg?w=1"),
            normalize_photo_url("https://cdn/b.jpg?w=1")
        );
    }

    #[test]
    fn test_dimension_hints() {
        assert_eq!(
            dimension_hints("https://cdn/a.jpg?maxwidth=1600&h=1067"),
            (Some(1600), Some(1067))
        );
        assert_eq!(dimension_hints("https://cdn/a.jpg"), (None, None));
    }
}
