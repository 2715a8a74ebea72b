pub mod mock_exchange;
