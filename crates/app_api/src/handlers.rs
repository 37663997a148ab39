use usage_app::{
    AccountList, AppError, ExportArtifact, RangeParams, Result, Selection, ViewState,
};
use usage_core::{
    AccountSelection, CategoryFilter, Dimension, Granularity, Measure, TimeSeriesRow,
};
use usage_engine::{BreakdownView, SummaryView};

use crate::{
    AccountsRequest, AppContext, RefreshResponse, SelectionRequest, StatusResponse,
};

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_measure(measure: Option<String>) -> Result<Option<Measure>> {
    present(measure)
        .map(|value| {
            Measure::parse(&value).ok_or_else(|| {
                AppError::InvalidInput(format!("unsupported measure {}", value))
            })
        })
        .transpose()
}

fn parse_view(view: Option<String>) -> Result<Option<Dimension>> {
    present(view)
        .map(|value| match Dimension::parse(&value) {
            Some(dimension @ (Dimension::Partition | Dimension::User)) => Ok(dimension),
            _ => Err(AppError::InvalidInput(format!("unsupported view {}", value))),
        })
        .transpose()
}

fn parse_class(class: Option<String>) -> Result<CategoryFilter> {
    match present(class) {
        None => Ok(CategoryFilter::All),
        Some(value) => CategoryFilter::parse(&value).ok_or_else(|| {
            AppError::InvalidInput(format!("unsupported partition class {}", value))
        }),
    }
}

fn parse_granularity(granularity: Option<String>) -> Result<Granularity> {
    match present(granularity) {
        None => Ok(Granularity::default()),
        Some(value) => Granularity::parse(&value)
            .ok_or_else(|| AppError::InvalidInput(format!("unsupported granularity {}", value))),
    }
}

/// Turns a raw request into a typed selection. Missing pieces stay `None`
/// so the view reports idle; malformed pieces are rejected.
pub fn parse_selection(req: SelectionRequest) -> Result<Selection> {
    let accounts = req.account.and_then(|field| {
        AccountSelection::from_list(
            field
                .into_list()
                .into_iter()
                .map(|account| account.trim().to_string()),
        )
    });
    let range = usage_app::resolve_range(&RangeParams {
        range: present(req.range),
        start: present(req.start),
        end: present(req.end),
    })?;
    Ok(Selection {
        accounts,
        view: parse_view(req.view)?,
        measure: parse_measure(req.measure)?,
        category: parse_class(req.partition_class)?,
        range,
        granularity: parse_granularity(req.granularity)?,
    })
}

pub fn status(ctx: &AppContext) -> StatusResponse {
    let snapshot = ctx.app_state.services.usage.status();
    StatusResponse {
        loaded: snapshot.is_some(),
        snapshot,
        config_path: ctx
            .config_path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
    }
}

pub fn refresh(ctx: &AppContext) -> Result<RefreshResponse> {
    ctx.app_state.refresh_data().map(RefreshResponse::from)
}

pub fn accounts(ctx: &AppContext, req: AccountsRequest) -> Result<AccountList> {
    ctx.app_state.services.accounts.list(req.user.as_deref())
}

pub fn timeseries(
    ctx: &AppContext,
    req: SelectionRequest,
) -> Result<ViewState<Vec<TimeSeriesRow>>> {
    let selection = parse_selection(req)?;
    ctx.app_state.services.usage.timeseries(&selection)
}

pub fn breakdown(ctx: &AppContext, req: SelectionRequest) -> Result<ViewState<BreakdownView>> {
    let selection = parse_selection(req)?;
    ctx.app_state.services.usage.breakdown(&selection)
}

pub fn summary(ctx: &AppContext, req: SelectionRequest) -> Result<ViewState<SummaryView>> {
    let selection = parse_selection(req)?;
    ctx.app_state.services.usage.summary(&selection)
}

pub fn export(ctx: &AppContext, req: SelectionRequest) -> Result<ViewState<ExportArtifact>> {
    let selection = parse_selection(req)?;
    ctx.app_state.services.usage.export(&selection)
}
