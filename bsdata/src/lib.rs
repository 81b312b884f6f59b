pub mod cli;
pub mod error;
pub mod model;

pub use cli::{BaostockClient, CursorState, ResultSet, BAOSTOCK_URL};
pub use error::Error;
pub use model::{
    AdjustFlag, Frequency, QueryCommand, QueryHistoryKData, QueryHs300Stocks, QueryZz500Stocks,
    SUCCESS_CODE,
};
