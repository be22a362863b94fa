//! Initial schema.
//!
//! - `accounts`: balance holders, two-level hierarchy through `parent_id`
//! - `categories`: income/expense classification, balance derived on read
//! - `partners`: counterparties, balance derived on read
//! - `transactions`: money movements with soft delete
//!
//! Money columns hold integer minor units. Ids are UUID strings.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    OwnerId,
    Name,
    Kind,
    Currency,
    BalanceMinor,
    LimitMinor,
    ParentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    OwnerId,
    Name,
    Kind,
    ParentId,
    CreatedAt,
}

#[derive(Iden)]
enum Partners {
    Table,
    Id,
    OwnerId,
    Name,
    Email,
    Phone,
    TaxNo,
    Identify,
    ParentId,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    OwnerId,
    Kind,
    AmountMinor,
    Currency,
    OccurredAt,
    FromAccountId,
    FromCategoryId,
    ToAccountId,
    ToCategoryId,
    PartnerId,
    Note,
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    DeletedAt,
    DeletedBy,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::OwnerId).string().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(
                        ColumnDef::new(Accounts::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Accounts::LimitMinor).big_integer())
                    .col(ColumnDef::new(Accounts::ParentId).string())
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-parent_id")
                            .from(Accounts::Table, Accounts::ParentId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-owner_id")
                    .table(Accounts::Table)
                    .col(Accounts::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-parent_id")
                    .table(Accounts::Table)
                    .col(Accounts::ParentId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::OwnerId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::ParentId).string())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-owner_id")
                    .table(Categories::Table)
                    .col(Categories::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Partners
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Partners::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Partners::OwnerId).string().not_null())
                    .col(ColumnDef::new(Partners::Name).string().not_null())
                    .col(ColumnDef::new(Partners::Email).string())
                    .col(ColumnDef::new(Partners::Phone).string())
                    .col(ColumnDef::new(Partners::TaxNo).string())
                    .col(ColumnDef::new(Partners::Identify).string())
                    .col(ColumnDef::new(Partners::ParentId).string())
                    .col(ColumnDef::new(Partners::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-partners-parent_id")
                            .from(Partners::Table, Partners::ParentId)
                            .to(Partners::Table, Partners::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // NULLs never collide, so only filled contact fields are unique.
        for (name, column) in [
            ("idx-partners-owner_id-email-unique", Partners::Email),
            ("idx-partners-owner_id-phone-unique", Partners::Phone),
            ("idx-partners-owner_id-tax_no-unique", Partners::TaxNo),
            ("idx-partners-owner_id-identify-unique", Partners::Identify),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Partners::Table)
                        .col(Partners::OwnerId)
                        .col(column)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        // ───────────────────────────────────────────────────────────────────
        // 4. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::OwnerId).string().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Currency).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::FromAccountId).string())
                    .col(ColumnDef::new(Transactions::FromCategoryId).string())
                    .col(ColumnDef::new(Transactions::ToAccountId).string())
                    .col(ColumnDef::new(Transactions::ToCategoryId).string())
                    .col(ColumnDef::new(Transactions::PartnerId).string())
                    .col(ColumnDef::new(Transactions::Note).string())
                    .col(ColumnDef::new(Transactions::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Transactions::UpdatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::DeletedAt).timestamp())
                    .col(ColumnDef::new(Transactions::DeletedBy).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-owner_id-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::OwnerId)
                    .col(Transactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-transactions-from_account_id", Transactions::FromAccountId),
            ("idx-transactions-to_account_id", Transactions::ToAccountId),
            ("idx-transactions-from_category_id", Transactions::FromCategoryId),
            ("idx-transactions-to_category_id", Transactions::ToCategoryId),
            ("idx-transactions-partner_id", Transactions::PartnerId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Transactions::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Partners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
