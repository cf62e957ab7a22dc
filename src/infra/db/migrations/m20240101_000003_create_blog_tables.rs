//! Migration: blog authors, categories, tags and articles.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlogAuthors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogAuthors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlogAuthors::Name).string_len(100).not_null())
                    .col(ColumnDef::new(BlogAuthors::Bio).text().not_null().default(""))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogCategories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlogCategories::Name).string_len(40).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogTags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlogTags::Name).string_len(20).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogArticles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogArticles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlogArticles::Title).string_len(200).not_null())
                    .col(ColumnDef::new(BlogArticles::Content).text().not_null().default(""))
                    .col(
                        ColumnDef::new(BlogArticles::PubDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlogArticles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BlogArticles::AuthorId).integer().not_null())
                    .col(ColumnDef::new(BlogArticles::CategoryId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_articles_author_id")
                            .from(BlogArticles::Table, BlogArticles::AuthorId)
                            .to(BlogAuthors::Table, BlogAuthors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_articles_category_id")
                            .from(BlogArticles::Table, BlogArticles::CategoryId)
                            .to(BlogCategories::Table, BlogCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogArticleTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogArticleTags::ArticleId).integer().not_null())
                    .col(ColumnDef::new(BlogArticleTags::TagId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(BlogArticleTags::ArticleId)
                            .col(BlogArticleTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_article_tags_article_id")
                            .from(BlogArticleTags::Table, BlogArticleTags::ArticleId)
                            .to(BlogArticles::Table, BlogArticles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_article_tags_tag_id")
                            .from(BlogArticleTags::Table, BlogArticleTags::TagId)
                            .to(BlogTags::Table, BlogTags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            BlogArticleTags::Table.into_iden(),
            BlogArticles::Table.into_iden(),
            BlogTags::Table.into_iden(),
            BlogCategories::Table.into_iden(),
            BlogAuthors::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum BlogAuthors {
    Table,
    Id,
    Name,
    Bio,
}

#[derive(Iden)]
enum BlogCategories {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum BlogTags {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum BlogArticles {
    Table,
    Id,
    Title,
    Content,
    PubDate,
    UpdatedAt,
    AuthorId,
    CategoryId,
}

#[derive(Iden)]
enum BlogArticleTags {
    Table,
    ArticleId,
    TagId,
}
