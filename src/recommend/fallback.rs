use crate::config::ImageFallback;

/// Decides what an image search returns when the model call fails.
/// Returning `None` lets the error reach the caller.
pub trait FallbackStrategy: Send + Sync {
    fn fallback(&self, filename: &str) -> Option<Vec<String>>;
}

pub struct NoFallback;

impl FallbackStrategy for NoFallback {
    fn fallback(&self, _filename: &str) -> Option<Vec<String>> {
        None
    }
}

/// Canned lists chosen by words in the uploaded filename.
pub struct FilenameFallback;

const LANDSCAPE: &[&str] = &[
    "Planet Earth",
    "Our Planet",
    "Into the Wild",
    "The Revenant",
    "Lord of the Rings",
    "The Secret Life of Walter Mitty",
    "Jurassic Park",
    "Avatar",
    "The Grand Budapest Hotel",
    "Game of Thrones",
];

const PORTRAIT: &[&str] = &[
    "The Queen's Gambit",
    "Breaking Bad",
    "The Crown",
    "Joker",
    "A Star is Born",
    "The Social Network",
    "The Theory of Everything",
    "Little Women",
    "Pride & Prejudice",
    "Nomadland",
];

const ANIME: &[&str] = &[
    "Spirited Away",
    "My Neighbor Totoro",
    "Attack on Titan",
    "Your Name",
    "Demon Slayer",
    "Death Note",
    "One Punch Man",
    "Hunter x Hunter",
    "Fullmetal Alchemist: Brotherhood",
    "Princess Mononoke",
];

const SCI_FI: &[&str] = &[
    "Blade Runner 2049",
    "Interstellar",
    "The Matrix",
    "Inception",
    "Arrival",
    "Ex Machina",
    "Black Mirror",
    "Stranger Things",
    "Dune",
    "The Expanse",
];

impl FallbackStrategy for FilenameFallback {
    fn fallback(&self, filename: &str) -> Option<Vec<String>> {
        let name = filename.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

        let list = if has(&["landscape", "nature"]) {
            LANDSCAPE
        } else if has(&["portrait", "person"]) {
            PORTRAIT
        } else if has(&["anime", "cartoon", "killua"]) {
            ANIME
        } else {
            SCI_FI
        };

        Some(list.iter().map(|s| s.to_string()).collect())
    }
}

pub fn from_config(setting: ImageFallback) -> Box<dyn FallbackStrategy> {
    match setting {
        ImageFallback::None => Box::new(NoFallback),
        ImageFallback::Filename => Box::new(FilenameFallback),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fallback() {
        assert_eq!(NoFallback.fallback("anime.png"), None);
    }

    #[test]
    fn test_filename_lists() {
        let first = |name: &str| FilenameFallback.fallback(name).unwrap()[0].clone();
        assert_eq!(first("My_Landscape.JPG"), "Planet Earth");
        assert_eq!(first("portrait-01.png"), "The Queen's Gambit");
        assert_eq!(first("killua.jpeg"), "Spirited Away");
        assert_eq!(first("upload.png"), "Blade Runner 2049");
    }

    #[test]
    fn test_from_config() {
        assert!(from_config(ImageFallback::None).fallback("x").is_none());
        assert_eq!(
            from_config(ImageFallback::Filename).fallback("x").map(|l| l.len()),
            Some(10)
        );
    }
}
