//! Mapping between engine types and API bodies.

use api_types::{
    account::{AccountKind as ApiAccountKind, AccountView},
    category::{CategoryBalanceView, CategoryKind as ApiCategoryKind, CategoryView},
    partner::{PartnerBalanceView, PartnerContact as ApiContact, PartnerView},
    transaction::{TransactionKind as ApiTransactionKind, TransactionView},
};
use engine::{
    Account, AccountKind, Category, CategoryBalance, CategoryKind, Currency, Partner,
    PartnerBalance, PartnerContact, Transaction, TransactionKind,
};

pub(crate) fn currency_to_api(currency: Currency) -> api_types::Currency {
    match currency {
        Currency::Eur => api_types::Currency::Eur,
        Currency::Usd => api_types::Currency::Usd,
        Currency::Gbp => api_types::Currency::Gbp,
        Currency::Jpy => api_types::Currency::Jpy,
        Currency::Vnd => api_types::Currency::Vnd,
    }
}

pub(crate) fn currency_from_api(currency: api_types::Currency) -> Currency {
    match currency {
        api_types::Currency::Eur => Currency::Eur,
        api_types::Currency::Usd => Currency::Usd,
        api_types::Currency::Gbp => Currency::Gbp,
        api_types::Currency::Jpy => Currency::Jpy,
        api_types::Currency::Vnd => Currency::Vnd,
    }
}

pub(crate) fn account_kind_from_api(kind: ApiAccountKind) -> AccountKind {
    match kind {
        ApiAccountKind::Payment => AccountKind::Payment,
        ApiAccountKind::Saving => AccountKind::Saving,
        ApiAccountKind::Lending => AccountKind::Lending,
        ApiAccountKind::Debt => AccountKind::Debt,
        ApiAccountKind::CreditCard => AccountKind::CreditCard,
        ApiAccountKind::Invest => AccountKind::Invest,
    }
}

fn account_kind_to_api(kind: AccountKind) -> ApiAccountKind {
    match kind {
        AccountKind::Payment => ApiAccountKind::Payment,
        AccountKind::Saving => ApiAccountKind::Saving,
        AccountKind::Lending => ApiAccountKind::Lending,
        AccountKind::Debt => ApiAccountKind::Debt,
        AccountKind::CreditCard => ApiAccountKind::CreditCard,
        AccountKind::Invest => ApiAccountKind::Invest,
    }
}

pub(crate) fn category_kind_from_api(kind: ApiCategoryKind) -> CategoryKind {
    match kind {
        ApiCategoryKind::Income => CategoryKind::Income,
        ApiCategoryKind::Expense => CategoryKind::Expense,
    }
}

fn category_kind_to_api(kind: CategoryKind) -> ApiCategoryKind {
    match kind {
        CategoryKind::Income => ApiCategoryKind::Income,
        CategoryKind::Expense => ApiCategoryKind::Expense,
    }
}

pub(crate) fn transaction_kind_from_api(kind: ApiTransactionKind) -> TransactionKind {
    match kind {
        ApiTransactionKind::Income => TransactionKind::Income,
        ApiTransactionKind::Expense => TransactionKind::Expense,
        ApiTransactionKind::Transfer => TransactionKind::Transfer,
    }
}

fn transaction_kind_to_api(kind: TransactionKind) -> ApiTransactionKind {
    match kind {
        TransactionKind::Income => ApiTransactionKind::Income,
        TransactionKind::Expense => ApiTransactionKind::Expense,
        TransactionKind::Transfer => ApiTransactionKind::Transfer,
    }
}

pub(crate) fn contact_from_api(contact: ApiContact) -> PartnerContact {
    PartnerContact {
        email: contact.email,
        phone: contact.phone,
        tax_no: contact.tax_no,
        identify: contact.identify,
    }
}

fn contact_to_api(contact: PartnerContact) -> ApiContact {
    ApiContact {
        email: contact.email,
        phone: contact.phone,
        tax_no: contact.tax_no,
        identify: contact.identify,
    }
}

pub(crate) fn account_view(account: Account) -> AccountView {
    AccountView {
        available_limit_minor: account.available_limit().map(|limit| limit.minor()),
        id: account.id,
        name: account.name,
        kind: account_kind_to_api(account.kind),
        currency: currency_to_api(account.currency),
        balance_minor: account.balance.minor(),
        limit_minor: account.limit.map(|limit| limit.minor()),
        parent_id: account.parent_id,
    }
}

pub(crate) fn category_view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: category_kind_to_api(category.kind),
        parent_id: category.parent_id,
    }
}

pub(crate) fn category_balance_view(node: CategoryBalance) -> CategoryBalanceView {
    CategoryBalanceView {
        category: category_view(node.category),
        own_balance_minor: node.own_balance.minor(),
        balance_minor: node.balance.minor(),
    }
}

pub(crate) fn partner_view(partner: Partner) -> PartnerView {
    PartnerView {
        id: partner.id,
        name: partner.name,
        contact: contact_to_api(partner.contact),
        parent_id: partner.parent_id,
    }
}

pub(crate) fn partner_balance_view(node: PartnerBalance) -> PartnerBalanceView {
    PartnerBalanceView {
        partner: partner_view(node.partner),
        own_balance_minor: node.own_balance.minor(),
        balance_minor: node.balance.minor(),
    }
}

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    let refs = tx.movement.refs();
    TransactionView {
        id: tx.id,
        kind: transaction_kind_to_api(tx.kind()),
        amount_minor: tx.amount.minor(),
        currency: currency_to_api(tx.currency),
        occurred_at: tx.occurred_at,
        from_account_id: refs.from_account_id,
        from_category_id: refs.from_category_id,
        to_account_id: refs.to_account_id,
        to_category_id: refs.to_category_id,
        partner_id: tx.partner_id,
        note: tx.note,
        created_by: tx.created_by,
        deleted_at: tx.deleted_at,
    }
}

pub(crate) fn tree<T, U>(tree: engine::Tree<T>, f: impl Fn(T) -> U) -> api_types::Tree<U> {
    api_types::Tree {
        root: f(tree.root),
        children: tree.children.into_iter().map(f).collect(),
    }
}
