//! Movie models.
//!
//! `MovieDocument` is the BSON shape read from the `movies` collection,
//! `Movie` is the JSON shape returned to clients and stored in the cache.

use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Fields every read returns.
pub const MOVIE_PROJECTION: [&str; 3] = ["_id", "title", "year"];

/// Projected movie document as stored in MongoDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub year: Option<i32>,
}

/// A movie record as seen by clients.
///
/// The id is the hex form of the document's ObjectId.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl From<MovieDocument> for Movie {
    fn from(doc: MovieDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            title: doc.title,
            year: doc.year,
        }
    }
}

/// Partial update of a movie. Only fields that are present are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoviePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl MoviePatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.year.is_none() && self.director.is_none() && self.genre.is_none()
    }

    /// Build the body of a `$set` update.
    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();

        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(year) = self.year {
            set.insert("year", year);
        }
        if let Some(director) = &self.director {
            set.insert("director", director.as_str());
        }
        if let Some(genre) = &self.genre {
            set.insert("genre", genre.as_str());
        }

        set
    }
}
