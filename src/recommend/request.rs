use bytes::Bytes;

/// Instruction sent to the model, optionally with an image attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub text: String,
    pub image: Option<Bytes>,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(text: impl Into<String>, image: impl Into<Bytes>) -> Self {
        Self {
            text: text.into(),
            image: Some(image.into()),
        }
    }
}

pub const IMAGE_SUMMARY_PROMPT: &str = "Describe this image in less than 100 words, focusing on visual style, mood, genre, and any themes that might relate to movies or TV shows.";
pub const IMAGE_RECOMMEND_PROMPT: &str = "Based on this image, recommend 10 movies or TV shows that are visually or thematically similar.";

/// A text-based recommendation request. The payload is the user's string,
/// forwarded into the prompt verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    Movie(String),
    TvShow(String),
    Genre(String),
    Description(String),
    FindMovie(String),
}

/// Which request an endpoint builds; knows the field it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendKind {
    Movie,
    TvShow,
    Genre,
    Description,
    FindMovie,
}

impl RecommendKind {
    pub fn field(&self) -> &'static str {
        match self {
            RecommendKind::Movie => "movieName",
            RecommendKind::TvShow => "tvShowName",
            RecommendKind::Genre => "genre",
            RecommendKind::Description | RecommendKind::FindMovie => "description",
        }
    }

    pub fn missing_message(&self) -> &'static str {
        match self {
            RecommendKind::Movie => "Movie name is required",
            RecommendKind::TvShow => "TV show name is required",
            RecommendKind::Genre => "Genre is required",
            RecommendKind::Description | RecommendKind::FindMovie => "Description is required",
        }
    }

    pub fn with_value(&self, value: String) -> Recommendation {
        match self {
            RecommendKind::Movie => Recommendation::Movie(value),
            RecommendKind::TvShow => Recommendation::TvShow(value),
            RecommendKind::Genre => Recommendation::Genre(value),
            RecommendKind::Description => Recommendation::Description(value),
            RecommendKind::FindMovie => Recommendation::FindMovie(value),
        }
    }
}

impl Recommendation {
    pub fn kind(&self) -> RecommendKind {
        match self {
            Recommendation::Movie(_) => RecommendKind::Movie,
            Recommendation::TvShow(_) => RecommendKind::TvShow,
            Recommendation::Genre(_) => RecommendKind::Genre,
            Recommendation::Description(_) => RecommendKind::Description,
            Recommendation::FindMovie(_) => RecommendKind::FindMovie,
        }
    }

    pub fn prompt(&self) -> Prompt {
        let text = match self {
            Recommendation::Movie(name) => format!(
                "Based on the movie '{}', suggest 10 similar movies. Just list the movie names, numbered 1-10. No additional details needed.",
                name
            ),
            Recommendation::TvShow(name) => format!(
                "Based on the TV show '{}', suggest 10 similar TV shows. Just list the TV show names, numbered 1-10. No additional details needed.",
                name
            ),
            Recommendation::Genre(genre) => format!(
                "Suggest 10 top movies and TV shows in the '{}' genre. List them in format: '[Movie/TV] Title'. Number them 1-10. No additional details needed.",
                genre
            ),
            Recommendation::Description(description) => format!(
                "Suggest 10 movies and TV shows that match this description: '{}'. List them in format: '[Movie/TV] Title'. Number them 1-10. No additional details needed.",
                description
            ),
            Recommendation::FindMovie(description) => format!(
                "Based on this description: '{}', identify the most likely movie titles that match. Return the top 5 possible movies, numbered 1-5, with a one-sentence explanation for each. Format as: 'Movie Title - Brief explanation'",
                description
            ),
        };
        Prompt::text(text)
    }
}

/// An uploaded image, read back from its spool file. Cloning shares the
/// bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Bytes,
}
