use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .col(pk_uuid(User::Id))
                    .col(string(User::Email))
                    .col(string(User::PasswordHash))
                    .col(string(User::DisplayName))
                    .col(string(User::Role))
                    .col(string(User::Avatar))
                    .col(timestamp(User::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Emails are stored lowercased, so this index is the case-insensitive
        // uniqueness guarantee.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_email_unique")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(User::Table)
                    .col(User::Role)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    Email,
    PasswordHash,
    DisplayName,
    Role,
    Avatar,
    CreatedAt,
}
