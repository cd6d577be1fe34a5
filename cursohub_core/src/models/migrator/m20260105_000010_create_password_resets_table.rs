use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_users_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PasswordReset::Table)
                    .col(pk_uuid(PasswordReset::UserId))
                    .col(string(PasswordReset::Token))
                    .col(timestamp(PasswordReset::ExpiresAt))
                    .col(timestamp(PasswordReset::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-password-reset-user_id")
                            .from(PasswordReset::Table, PasswordReset::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_password_resets_token_unique")
                    .table(PasswordReset::Table)
                    .col(PasswordReset::Token)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordReset::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PasswordReset {
    Table,
    UserId,
    Token,
    ExpiresAt,
    CreatedAt,
}
