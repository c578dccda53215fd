//! Parquet storage for the cleaned article table.
//!
//! The table has exactly two required UTF-8 columns, `article_url` and
//! `article_text`, one row per article, in a single GZIP-compressed row
//! group. Each run overwrites the file.

use crate::models::{ArticleCorpus, ArticleRecord};
use crate::utils::ensure_parent_dir;
use parquet::basic::{Compression, GzipLevel};
use parquet::data_type::{ByteArray, ByteArrayType};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::record::RowAccessor;
use parquet::schema::parser::parse_message_type;
use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

const ARTICLE_SCHEMA: &str = "
message article {
    REQUIRED BYTE_ARRAY article_url (UTF8);
    REQUIRED BYTE_ARRAY article_text (UTF8);
}
";

/// Write every record in `corpus` to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = corpus.len()))]
pub fn write_articles(corpus: &ArticleCorpus, path: &Path) -> Result<(), Box<dyn Error>> {
    ensure_parent_dir(path)?;

    let schema = Arc::new(parse_message_type(ARTICLE_SCHEMA)?);
    let props = Arc::new(
        WriterProperties::builder()
            .set_compression(Compression::GZIP(GzipLevel::default()))
            .build(),
    );

    let (urls, texts): (Vec<ByteArray>, Vec<ByteArray>) = corpus
        .iter()
        .map(|(url, text)| (ByteArray::from(url), ByteArray::from(text)))
        .unzip();
    let columns = [urls, texts];

    let file = File::create(path)?;
    let mut writer = SerializedFileWriter::new(file, schema, props)?;
    let mut row_group = writer.next_row_group()?;
    let mut index = 0;
    while let Some(mut column) = row_group.next_column()? {
        column
            .typed::<ByteArrayType>()
            .write_batch(&columns[index], None, None)?;
        column.close()?;
        index += 1;
    }
    row_group.close()?;
    writer.close()?;

    info!("Wrote article table");
    Ok(())
}

/// Read an article table written by [`write_articles`].
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_articles(path: &Path) -> Result<ArticleCorpus, Box<dyn Error>> {
    let reader = SerializedFileReader::new(File::open(path)?)?;

    let mut records = Vec::new();
    for row in reader.get_row_iter(None)? {
        let row = row?;
        records.push(ArticleRecord {
            article_url: row.get_string(0)?.clone(),
            article_text: row.get_string(1)?.clone(),
        });
    }

    let corpus: ArticleCorpus = records.into_iter().collect();
    info!(rows = corpus.len(), "Read article table");
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_table(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tech_blog_topics_{}_{}", std::process::id(), name))
            .join("article_data.parquet")
    }

    #[test]
    fn test_write_then_read_articles() {
        let path = temp_table("roundtrip");
        let mut corpus = ArticleCorpus::new();
        corpus.insert("https://blog.example.jp/a/", "機械学習の記事");
        corpus.insert("https://blog.example.jp/b/", "");

        write_articles(&corpus, &path).unwrap();
        let back = read_articles(&path).unwrap();

        assert_eq!(back, corpus);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_write_overwrites_previous_table() {
        let path = temp_table("overwrite");
        let mut first = ArticleCorpus::new();
        first.insert("https://blog.example.jp/old/", "古い");
        first.insert("https://blog.example.jp/older/", "もっと古い");
        write_articles(&first, &path).unwrap();

        let mut second = ArticleCorpus::new();
        second.insert("https://blog.example.jp/new/", "新しい");
        write_articles(&second, &path).unwrap();

        let back = read_articles(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.get("https://blog.example.jp/new/"), Some("新しい"));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_table_uses_gzip_and_two_columns() {
        let path = temp_table("schema");
        let mut corpus = ArticleCorpus::new();
        corpus.insert("https://blog.example.jp/a/", "本文");
        write_articles(&corpus, &path).unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        let metadata = reader.metadata();
        let schema = metadata.file_metadata().schema_descr();
        assert_eq!(schema.num_columns(), 2);
        assert_eq!(schema.column(0).name(), "article_url");
        assert_eq!(schema.column(1).name(), "article_text");
        assert!(matches!(
            metadata.row_group(0).column(0).compression(),
            Compression::GZIP(_)
        ));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
