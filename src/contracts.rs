//! On-chain contract surfaces consumed by the dashboard

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IArubToken {
        function totalSupply() external view returns (uint256);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function currentPrice() external view returns (uint256);
        function mint(uint256 usdtAmount) external payable;
        function burn(uint256 tokenAmount) external;
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function name() external view returns (string);
        function symbol() external view returns (string);

        event Transfer(address indexed from, address indexed to, uint256 value);
        event Mint(address indexed to, uint256 usdtAmount, uint256 tokenAmount);
        event Burn(address indexed from, uint256 tokenAmount, uint256 usdtAmount);
    }
}

sol! {
    #[sol(rpc)]
    interface IStableAsset {
        function totalSupply() external view returns (uint256);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function faucet() external;
        function name() external view returns (string);
        function symbol() external view returns (string);

        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

sol! {
    #[sol(rpc)]
    interface IStaking {
        function totalStakedUSDT() external view returns (uint256);
        function totalStakedARUB() external view returns (uint256);
        function userStakes(address user) external view returns (
            uint256 usdtAmount,
            uint256 arubAmount,
            uint256 timestamp,
            uint256 lastClaimTime
        );
        function stake(address token, uint256 amount) external;
        function unstake(address token) external;
        function claimRewards() external;

        event Staked(address indexed user, address indexed token, uint256 amount);
        event Unstaked(address indexed user, address indexed token, uint256 amount);
        event RewardsClaimed(address indexed user, uint256 amount);
    }
}
