use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub created_at: Option<String>,
}

/// The narrow contract the engine needs from whatever owns the posts.
/// It never creates or deletes posts.
pub trait PostStore {
    fn get(&self, slug: &str) -> Result<Option<Post>, StoreError>;

    /// All posts, or only those whose slug is in `slugs`, ordered by id.
    fn get_all(&self, slugs: Option<&[String]>) -> Result<Vec<Post>, StoreError>;

    fn update(&self, slug: &str, content: &str, title: Option<&str>) -> Result<(), StoreError>;
}

const SELECT_POST: &str = "SELECT id, slug, title, content, author, created_at FROM posts";

pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Open an existing blog database. Never creates one.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::Missing(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let has_posts: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'posts')",
            [],
            |row| row.get(0),
        )?;
        if !has_posts {
            return Err(StoreError::NoPostsTable(path.to_path_buf()));
        }
        Ok(SqliteStore {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?)
    }
}

fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        content: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        author: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl PostStore for SqliteStore {
    fn get(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let post = self
            .conn
            .query_row(&format!("{SELECT_POST} WHERE slug = ?1"), params![slug], row_to_post)
            .optional()?;
        Ok(post)
    }

    fn get_all(&self, slugs: Option<&[String]>) -> Result<Vec<Post>, StoreError> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_POST} ORDER BY id"))?;
        let rows = stmt
            .query_map([], row_to_post)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match slugs {
            Some(wanted) => rows.into_iter().filter(|p| wanted.contains(&p.slug)).collect(),
            None => rows,
        })
    }

    fn update(&self, slug: &str, content: &str, title: Option<&str>) -> Result<(), StoreError> {
        let changed = match title {
            Some(t) => self.conn.execute(
                "UPDATE posts SET content = ?1, title = ?2 WHERE slug = ?3",
                params![content, t, slug],
            )?,
            None => self.conn.execute(
                "UPDATE posts SET content = ?1 WHERE slug = ?2",
                params![content, slug],
            )?,
        };
        if changed == 0 {
            return Err(StoreError::NoRowUpdated(slug.to_string()));
        }
        Ok(())
    }
}
