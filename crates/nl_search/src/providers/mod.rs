pub mod ddg;
